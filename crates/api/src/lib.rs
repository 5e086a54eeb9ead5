//! HTTP API: server wiring, REST routes and the GraphQL endpoint.

pub mod app;
pub mod config;

pub use config::AppConfig;

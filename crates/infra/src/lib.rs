//! Infrastructure layer: stores, the registration service and database config.

pub mod config;
pub mod registration;
pub mod store;

pub use config::{ConfigError, DatabaseConfig};
pub use registration::{RegistrationError, RegistrationService};
pub use store::{InMemoryStore, PostgresStore, ProductStore, StoreError, UserStore};

#[cfg(test)]
mod integration_tests;

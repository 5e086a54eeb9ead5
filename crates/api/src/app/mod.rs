//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the registration service
//! - `routes/`: REST routes + handlers (one file per area)
//! - `graphql.rs`: GraphQL schema and resolvers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use eoi_infra::StoreError;

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod graphql;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StoreError> {
    let services = services::build_services(config).await?;
    Ok(router_with(services))
}

/// Router over an already-built set of services.
pub fn router_with(services: AppServices) -> Router {
    let services = Arc::new(services);
    let schema = graphql::build_schema(services.clone());

    routes::router()
        .layer(Extension(services))
        .layer(Extension(schema))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

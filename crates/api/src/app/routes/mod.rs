use axum::{Router, routing::get};

pub mod graphql;
pub mod products;
pub mod system;
pub mod users;

/// Router for every endpoint. Handlers read `AppServices` and the GraphQL
/// schema from request extensions.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/graphql", get(graphql::graphiql).post(graphql::execute))
        .nest("/products", products::router())
        .merge(users::router())
}

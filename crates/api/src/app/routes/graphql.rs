use axum::{
    Json,
    extract::Extension,
    response::{Html, IntoResponse},
};

use async_graphql::http::GraphiQLSource;

use crate::app::graphql::AppSchema;

pub async fn execute(
    Extension(schema): Extension<AppSchema>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(request).await)
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

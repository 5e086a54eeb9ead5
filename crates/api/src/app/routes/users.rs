use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use eoi_core::UserId;
use eoi_users::Registration;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> axum::response::Response {
    let Json(registration) = match body {
        Ok(v) => v,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.registration().register(registration).await {
        Ok(details) => (StatusCode::CREATED, Json(dto::registration_to_json(&details))).into_response(),
        Err(e) => errors::registration_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.users().list_users().await {
        Ok(users) => Json(dto::users_to_json(&users)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: UserId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users().get_user(user_id).await {
        Ok(Some(user)) => Json(dto::user_to_json(&user)).into_response(),
        Ok(None) => errors::not_found(format!("user {user_id}")),
        Err(e) => errors::store_error_to_response(e),
    }
}

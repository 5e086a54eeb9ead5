use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use eoi_core::ProductId;
use eoi_products::seed_catalogue;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(seed_products).get(list_products))
        .route("/:id", get(get_product))
}

/// Create the demonstration products in one atomic batch.
///
/// Bypasses registration. A second call trips the unique name constraint.
pub async fn seed_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products().insert_products(seed_catalogue()).await {
        Ok(created) => (StatusCode::CREATED, Json(dto::products_to_json(&created))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products().list_products().await {
        Ok(products) => Json(dto::products_to_json(&products)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let product = match services.products().get_product(product_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return errors::not_found(format!("product {product_id}")),
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.users().users_interested_in(product_id).await {
        Ok(users) => Json(dto::product_detail_to_json(&product, &users)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

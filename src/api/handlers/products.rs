//! Product catalog endpoints.

use super::MessageResponse;
use crate::store::{Product, ProductStore, Store, StoreError};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[utoipa::path(
    post,
    path = "/products",
    request_body = Product,
    responses(
        (status = 201, description = "Product created.", body = MessageResponse),
        (status = 400, description = "Missing payload, empty id or empty name."),
        (status = 409, description = "A product with this id already exists."),
        (status = 500, description = "Store failure."),
    ),
    tag = "catalog"
)]
#[instrument(skip(store, payload))]
pub async fn create_product(
    store: Extension<Arc<dyn Store>>,
    payload: Option<Json<Product>>,
) -> Response {
    let product: Product = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if product.id.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid product id".to_string()).into_response();
    }

    if product.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Invalid product name".to_string()).into_response();
    }

    match store.insert_product(&product).await {
        Ok(()) => {
            info!(product_id = %product.id, "product created");
            (
                StatusCode::CREATED,
                Json(MessageResponse::new("Product created successfully")),
            )
                .into_response()
        }
        Err(StoreError::Conflict) => (
            StatusCode::CONFLICT,
            "Product already exists".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Error inserting product: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error inserting product".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/get-products",
    responses(
        (status = 200, description = "All products ordered by id.", body = [Product]),
        (status = 500, description = "Store failure."),
    ),
    tag = "catalog"
)]
pub async fn list_products(store: Extension<Arc<dyn Store>>) -> Response {
    match store.list_products().await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(err) => {
            error!("Failed to list products: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching products".to_string(),
            )
                .into_response()
        }
    }
}

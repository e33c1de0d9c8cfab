//! HTTP handlers for the REST API.
//!
//! Each handler validates its input before touching the store, then makes a
//! single repository call. The repository borrows one pooled connection for
//! that call and returns it on every path, so handlers never hold a
//! connection across validation or response serialization.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::dto::ApiResponse;
use super::error::{AppError, INVALID_PRODUCT_ID};
use super::state::AppState;
use crate::models::{parse_product_id, Product, ProductDraft, ProductId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const PRODUCT_NOT_FOUND: &str = "Product not found";

fn product_id(raw: &str) -> Result<ProductId, AppError> {
    parse_product_id(raw).map_err(|_| AppError::Validation(INVALID_PRODUCT_ID.to_string()))
}

fn draft_from_body(body: Result<Json<Value>, JsonRejection>) -> Result<ProductDraft, AppError> {
    let Json(body) = body?;
    Ok(ProductDraft::from_json(&body)?)
}

fn not_found() -> AppError {
    AppError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

/// GET /products
///
/// List all products ordered by id.
pub async fn list_products(
    State(state): State<AppState>,
) -> HandlerResult<ApiResponse<Vec<Product>>> {
    let products = state
        .repository
        .list_products()
        .await
        .map_err(AppError::store("Error fetching products"))?;

    let count = products.len();
    Ok(Json(ApiResponse::with_data(products).count(count)))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<ApiResponse<Product>> {
    let id = product_id(&raw_id)?;

    let product = state
        .repository
        .get_product(id)
        .await
        .map_err(AppError::store("Error fetching product"))?
        .ok_or_else(not_found)?;

    Ok(Json(ApiResponse::with_data(product)))
}

/// POST /products
///
/// Create a product and return the stored row with status 201.
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    let draft = draft_from_body(body)?;

    let product = state
        .repository
        .create_product(&draft)
        .await
        .map_err(AppError::store("Error creating product"))?;

    tracing::info!(id = %product.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data(product).message("Product created successfully")),
    ))
}

/// PUT /products/{id}
///
/// Replace name, price and stock of an existing product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HandlerResult<ApiResponse<Product>> {
    let id = product_id(&raw_id)?;
    let draft = draft_from_body(body)?;

    let product = state
        .repository
        .update_product(id, &draft)
        .await
        .map_err(AppError::store("Error updating product"))?
        .ok_or_else(not_found)?;

    tracing::info!(%id, "product updated");
    Ok(Json(
        ApiResponse::with_data(product).message("Product updated successfully"),
    ))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<ApiResponse<()>> {
    let id = product_id(&raw_id)?;

    let deleted = state
        .repository
        .delete_product(id)
        .await
        .map_err(AppError::store("Error deleting product"))?;
    if !deleted {
        return Err(not_found());
    }

    tracing::info!(%id, "product deleted");
    Ok(Json(ApiResponse::success_message(
        "Product deleted successfully",
    )))
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

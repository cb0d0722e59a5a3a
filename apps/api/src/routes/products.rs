//! Catalog endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ventas_core::validation::{validate_price_cents, validate_product_name, validate_sku};
use ventas_core::Product;
use ventas_db::repository::NewProduct;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub warranty_months: i64,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    validate_sku(&req.sku).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_product_name(&req.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_price_cents(req.price_cents).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if req.stock < 0 {
        return Err(ApiError::BadRequest("stock must not be negative".into()));
    }

    let product = state
        .db
        .products()
        .create(NewProduct {
            sku: req.sku,
            name: req.name,
            description: req.description,
            category: req.category,
            price_cents: req.price_cents,
            stock: req.stock,
            min_stock: req.min_stock,
            warranty_months: req.warranty_months,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list_active().await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

pub async fn get_by_sku(
    State(state): State<Arc<AppState>>,
    Path(sku): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_sku(&sku)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {sku}")))?;
    Ok(Json(product))
}

/// Soft delete; the row stays for ledger and order history.
pub async fn deactivate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().deactivate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Route table.

mod health;
mod inventory;
mod products;
mod reports;
mod returns;
mod shop;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Reports
        .route("/api/v1/reports/query", post(reports::query))
        .route("/api/v1/reports/{id}/export", get(reports::export))
        // Inventory ledger
        .route(
            "/api/v1/inventory/movements",
            post(inventory::record_movement).get(inventory::list_movements),
        )
        .route("/api/v1/inventory/low-stock", get(inventory::low_stock))
        // Catalog
        .route(
            "/api/v1/products",
            post(products::create).get(products::list),
        )
        .route(
            "/api/v1/products/{id}",
            get(products::get).delete(products::deactivate),
        )
        .route("/api/v1/products/sku/{sku}", get(products::get_by_sku))
        // Shopping flow
        .route("/api/v1/cart", get(shop::view_cart))
        .route("/api/v1/cart/items", post(shop::add_item))
        .route("/api/v1/cart/items/{product_id}", delete(shop::remove_item))
        .route("/api/v1/checkout", post(shop::checkout))
        .route("/api/v1/orders", get(shop::list_orders))
        .route("/api/v1/payments", post(shop::pay))
        // Returns
        .route(
            "/api/v1/returns",
            post(returns::create).get(returns::list),
        )
        .route("/api/v1/returns/{id}", get(returns::get))
        .route("/api/v1/returns/{id}/approve", post(returns::approve))
        .route("/api/v1/returns/{id}/reject", post(returns::reject))
        .route("/api/v1/returns/{id}/process", post(returns::process))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

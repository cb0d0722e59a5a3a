//! Cart, checkout and simulated payments.
//!
//! Auth is out of scope; requests identify the shopper by username and the
//! user record is created on first sight.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use ventas_core::validation::validate_quantity;
use ventas_core::{CartItem, CoreError, Money, Order, Payment, PaymentMethod};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub items: Vec<CartItem>,
    /// Item total in cents, shipping excluded.
    pub total_cents: i64,
}

pub async fn view_cart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> ApiResult<Json<CartResponse>> {
    let orders = state.db.orders();
    let user = orders.ensure_user(&params.user).await?;
    let cart = orders.get_or_create_cart(&user.id).await?;
    let items = orders.cart_items(&cart.id).await?;
    let total = items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.line_total());

    Ok(Json(CartResponse {
        cart_id: cart.id,
        items,
        total_cents: total.cents(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub user: String,
    pub product_id: String,
    pub quantity: i64,
}

pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<StatusCode> {
    validate_quantity(req.quantity).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let orders = state.db.orders();
    let user = orders.ensure_user(&req.user).await?;
    let cart = orders.get_or_create_cart(&user.id).await?;
    orders
        .add_cart_item(&cart.id, &req.product_id, req.quantity)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    Query(params): Query<UserParams>,
) -> ApiResult<StatusCode> {
    let orders = state.db.orders();
    let user = orders.ensure_user(&params.user).await?;
    let cart = orders.get_or_create_cart(&user.id).await?;
    orders.remove_cart_item(&cart.id, &product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order history for a shopper, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state.db.orders();
    let user = orders.ensure_user(&params.user).await?;
    Ok(Json(orders.list_for_user(&user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub user: String,
    pub address: String,
}

pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let orders = state.db.orders();
    let user = orders.ensure_user(&req.user).await?;

    let order = orders
        .checkout(&user.id, &req.address)
        .await?
        .ok_or(CoreError::EmptyCart)?;

    info!(order_id = %order.id, total_cents = order.total_cents, "order created");
    state
        .db
        .audit()
        .record_best_effort(&req.user, "shop.checkout", &order.id)
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    /// "paypal" or "stripe".
    pub method: String,
    /// Simulation switch; the gateway approves unless asked to fail.
    #[serde(default)]
    pub simulate_failure: bool,
}

pub async fn pay(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let method = PaymentMethod::parse(&req.method)
        .ok_or_else(|| CoreError::UnsupportedPaymentMethod(req.method.clone()))?;

    let payment = state
        .db
        .orders()
        .record_payment(&req.order_id, method, !req.simulate_failure)
        .await?;

    info!(
        order_id = %payment.order_id,
        method = method.as_str(),
        status = ?payment.status,
        "payment recorded"
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

//! Return request endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ventas_core::validation::validate_quantity;
use ventas_core::{Return, ReturnStatus};
use ventas_db::repository::NewReturn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
    /// Optional initial status; defaults to "requested". Creating directly
    /// as "processed" credits stock immediately.
    pub status: Option<String>,
    pub actor: Option<String>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> ApiResult<(StatusCode, Json<Return>)> {
    validate_quantity(req.quantity).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let status = match req.status.as_deref() {
        None => ReturnStatus::Requested,
        Some(token) => ReturnStatus::parse(token)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown return status: {token}")))?,
    };
    let processed_by = if status == ReturnStatus::Processed {
        req.actor.clone()
    } else {
        None
    };

    let ret = state
        .db
        .returns()
        .create(NewReturn {
            order_id: req.order_id,
            product_id: req.product_id,
            quantity: req.quantity,
            reason: req.reason,
            status,
            processed_by,
        })
        .await?;

    state
        .db
        .audit()
        .record_best_effort(
            req.actor.as_deref().unwrap_or("anonymous"),
            "returns.create",
            &ret.id,
        )
        .await;

    Ok((StatusCode::CREATED, Json(ret)))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub actor: Option<String>,
}

async fn transition(
    state: Arc<AppState>,
    id: String,
    next: ReturnStatus,
    req: TransitionRequest,
) -> ApiResult<Json<Return>> {
    let ret = state
        .db
        .returns()
        .transition(&id, next, req.actor.as_deref())
        .await?;

    state
        .db
        .audit()
        .record_best_effort(
            req.actor.as_deref().unwrap_or("anonymous"),
            "returns.transition",
            &format!("{} -> {}", ret.id, next.as_str()),
        )
        .await;

    Ok(Json(ret))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<Json<Return>> {
    transition(state, id, ReturnStatus::Approved, req).await
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<Json<Return>> {
    transition(state, id, ReturnStatus::Rejected, req).await
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<Json<Return>> {
    transition(state, id, ReturnStatus::Processed, req).await
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Return>> {
    let ret = state
        .db
        .returns()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Return not found: {id}")))?;
    Ok(Json(ret))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub order_id: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Return>>> {
    let returns = state.db.returns().list_for_order(&params.order_id).await?;
    Ok(Json(returns))
}

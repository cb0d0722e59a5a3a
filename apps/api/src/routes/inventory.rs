//! Stock ledger endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use ventas_core::validation::{validate_quantity, validate_uuid};
use ventas_core::{ledger, InventoryMovement, MovementDirection, Product};
use ventas_db::repository::NewMovement;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub product_id: String,
    /// "IN" or "OUT", case-insensitive.
    pub direction: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: String,
    pub actor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub movement: InventoryMovement,
    /// Counter value after the movement.
    pub stock: i64,
}

pub async fn record_movement(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MovementRequest>,
) -> ApiResult<(StatusCode, Json<MovementResponse>)> {
    let direction = MovementDirection::parse(&req.direction)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown direction: {}", req.direction)))?;
    validate_quantity(req.quantity).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    // Malformed ids are a caller mistake, not a missing product.
    validate_uuid(&req.product_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    // Friendly pre-flight against the current counter. The repository's
    // guarded UPDATE remains the authority under concurrency.
    let product = state
        .db
        .products()
        .get_by_id(&req.product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", req.product_id)))?;
    ledger::apply_movement(product.stock, direction, req.quantity)?;

    let (movement, stock) = state
        .db
        .movements()
        .record(NewMovement {
            product_id: req.product_id,
            direction,
            quantity: req.quantity,
            reason: req.reason,
            actor: req.actor.clone(),
        })
        .await?;

    info!(
        product_id = %movement.product_id,
        direction = direction.as_str(),
        quantity = movement.quantity,
        stock,
        "movement recorded"
    );
    state
        .db
        .audit()
        .record_best_effort(
            req.actor.as_deref().unwrap_or("anonymous"),
            "inventory.movement",
            &format!(
                "{} {} x{}",
                direction.as_str(),
                movement.product_id,
                movement.quantity
            ),
        )
        .await;

    Ok((StatusCode::CREATED, Json(MovementResponse { movement, stock })))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub product_id: String,
}

pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<InventoryMovement>>> {
    let movements = state
        .db
        .movements()
        .list_for_product(&params.product_id)
        .await?;
    Ok(Json(movements))
}

pub async fn low_stock(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list_low_stock().await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventas_db::{Database, DbConfig};

    use crate::config::{ApiConfig, DEFAULT_EXPORT_PAGE_SIZE};

    async fn state() -> Arc<AppState> {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        Arc::new(AppState {
            db,
            config: ApiConfig {
                http_port: 0,
                database_path: ":memory:".to_string(),
                export_page_size: DEFAULT_EXPORT_PAGE_SIZE,
            },
        })
    }

    #[tokio::test]
    async fn movement_with_malformed_id_is_a_bad_request() {
        let state = state().await;

        let err = record_movement(
            State(state),
            Json(MovementRequest {
                product_id: "not-a-uuid".to_string(),
                direction: "in".to_string(),
                quantity: 1,
                reason: String::new(),
                actor: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}

//! HTTP error mapping.
//!
//! Every handler returns `ApiResult<T>`; this module decides which errors
//! are client-visible and which collapse into a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use ventas_core::CoreError;
use ventas_db::DbError;

/// API errors, already shaped for the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::UnsupportedFormat(_) => "unsupported_format",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            // Internal detail goes to the log, never to the client.
            error!(%detail, "internal error");
        }
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::AlreadyExists { .. } => ApiError::Conflict(err.to_string()),
            DbError::InsufficientStock { .. } => ApiError::BadRequest(err.to_string()),
            DbError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            DbError::ReportQuery(detail) => ApiError::Internal(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Result type used by all handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_is_client_visible() {
        let api: ApiError = DbError::InsufficientStock {
            product_id: "p1".into(),
            available: 2,
            requested: 5,
        }
        .into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.to_string().contains("available 2"));
    }

    #[test]
    fn report_query_failure_is_opaque() {
        let api: ApiError = DbError::ReportQuery("no such column: foo".into()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The SQL detail must not leak into the response message.
        assert_eq!(api.to_string(), "Internal server error");
    }

    #[test]
    fn invalid_transition_conflicts() {
        let api: ApiError = DbError::InvalidTransition {
            id: "r1".into(),
            from: "processed".into(),
            to: "processed".into(),
        }
        .into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
    }
}

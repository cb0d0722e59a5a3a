//! Database error types.

use thiserror::Error;

/// Errors that can occur in the database layer.
#[derive(Error, Debug)]
pub enum DbError {
    /// Underlying sqlx error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation
    #[error("{entity} already exists: {detail}")]
    AlreadyExists { entity: &'static str, detail: String },

    /// A stock debit would take the counter below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A status change that the state machine does not allow.
    #[error("Return {id} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },

    /// Dynamic report SQL failed to execute (bad field path, etc).
    #[error("Report query failed: {0}")]
    ReportQuery(String),

    /// Serialization/internal error
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn already_exists(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            detail: detail.into(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

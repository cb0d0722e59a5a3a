//! Best-effort audit trail.
//!
//! Audit writes must never fail a business operation; failures are logged
//! and dropped.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::error::DbResult;

pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, actor: &str, action: &str, detail: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor, action, detail, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(actor)
        .bind(action)
        .bind(detail)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record, swallowing failures with a warning.
    pub async fn record_best_effort(&self, actor: &str, action: &str, detail: &str) {
        if let Err(e) = self.record(actor, action, detail).await {
            warn!(error = %e, action, "audit write failed");
        }
    }
}

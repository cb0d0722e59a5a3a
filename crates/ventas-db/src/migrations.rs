//! Embedded schema migrations.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Run all pending migrations. The SQL files are compiled into the binary.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    debug!("running migrations");
    sqlx::migrate!("../../migrations/sqlite").run(pool).await?;
    Ok(())
}

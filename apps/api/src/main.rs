//! # Ventas API
//!
//! HTTP server for the ventas back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ventas API Server                              │
//! │                                                                         │
//! │  Client ───► HTTP (8080) ───► Handlers ───► ventas-db ───► SQLite     │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                             ventas-core                                 │
//! │                       (parser, plan, ledger rules)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod routes;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ventas_db::{Database, DbConfig};

use crate::config::ApiConfig;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Ventas API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        "Configuration loaded"
    );

    // Open database and run migrations
    let db = Database::new(&DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    // Create shared state
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // Build router and serve
    let app = routes::router(state);
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %config.bind_address(), "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

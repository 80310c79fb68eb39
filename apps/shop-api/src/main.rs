//! # Shop API
//!
//! HTTP server for the shop backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shop API Server                                │
//! │                                                                         │
//! │  Client ───► HTTP (8000) ───► Router ───► Services ───► SQLite         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use shop_api::{ApiConfig, AppState};
use shop_db::{Database, DbConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_api=debug,tower_http=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting shop API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // Open database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port).parse()?;
    let state = Arc::new(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening for HTTP requests");

    axum::serve(listener, shop_api::router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

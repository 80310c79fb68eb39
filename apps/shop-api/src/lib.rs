//! # Shop API
//!
//! JSON HTTP server for the shop backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Shop API Routes                                │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Auth          │  │  Products      │  │  Orders                    ││
//! │  │                │  │                │  │                            ││
//! │  │ • POST register│  │ • GET products │  │ • POST orders  (core)      ││
//! │  │ • POST login   │  │   (filters,    │  │ • GET orders               ││
//! │  │ • GET me       │  │    pagination) │  │ • GET orders/{id}          ││
//! │  │ • POST logout  │  │                │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │  TraceLayer  │  │    JWT Auth              ││  │
//! │  │  │  (shop-db)   │  │  per-request │  │  + revocable token rows  ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `HTTP_PORT` - HTTP port (default: 8000)
//! - `DATABASE_PATH` - SQLite file (default: ./shop.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 86400)

use std::sync::Arc;

use axum::Router;
use shop_db::Database;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::ApiError;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState { db, jwt, config }
    }
}

/// Builds the application router with request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}

//! # HTTP Routes
//!
//! ```text
//! POST /register        ─┐
//! POST /login            │ auth.rs
//! GET  /me      (bearer) │
//! POST /logout  (bearer)─┘
//! GET  /products (bearer)   products.rs
//! GET  /orders   (bearer)─┐
//! GET  /orders/{id}       │ orders.rs
//! POST /orders   (bearer)─┘
//! GET  /health              (here)
//! ```
//!
//! Successful responses are wrapped as `{"status": "success", ...}`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use shop_core::{Page, ValidationError};
use shop_db::migrations::migration_status;

use crate::AppState;

pub mod auth;
pub mod orders;
pub mod products;

/// Builds the router with every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::routes())
        .merge(products::routes())
        .merge(orders::routes())
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `200` when the database answers, `503` otherwise.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.db.health_check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        );
    }

    match migration_status(state.db.pool()).await {
        Ok((total, applied)) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "migrations": { "total": total, "applied": applied },
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read migration status");
            (StatusCode::OK, Json(json!({ "status": "ok" })))
        }
    }
}

/// A paginated listing in the success envelope.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub page: Page<T>,
}

impl<T> From<Page<T>> for Listing<T> {
    fn from(page: Page<T>) -> Self {
        Listing {
            status: "success",
            page,
        }
    }
}

/// Parses an optional whole-number query parameter.
pub(crate) fn parse_number<T: std::str::FromStr>(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a whole number".to_string(),
        }),
    }
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::TestApp;
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;

        let (status, body) = app.get("/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["migrations"]["total"], body["migrations"]["applied"]);
    }

    #[tokio::test]
    async fn test_health_when_database_closed() {
        let app = TestApp::new().await;
        app.state.db.close().await;

        let (status, body) = app.get("/health", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u32>("page", Some("3")).unwrap(), Some(3));
        assert_eq!(parse_number::<u32>("page", Some("")).unwrap(), None);
        assert_eq!(parse_number::<u32>("page", None).unwrap(), None);

        let err = parse_number::<u32>("page", Some("-1")).unwrap_err();
        assert_eq!(err.field(), "page");
    }
}

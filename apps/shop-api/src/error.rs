//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Shop API                           │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                           │
//! │         │                                                               │
//! │         ├── ValidationError      ──► 422 {status:"error", errors}       │
//! │         ├── OrderCreationError   ──► 422 {status:"fail", code, message} │
//! │         ├── missing/bad token    ──► 401                                │
//! │         ├── unknown record       ──► 404                                │
//! │         └── DbError              ──► 500 (details only in the log)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error body carries a machine-readable `code` and a human-readable
//! `message`. Validation failures add `errors`, grouped by field.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shop_core::{OrderCreationError, ValidationError};
use shop_db::DbError;

use crate::services::order_service::OrderServiceError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "status": "error",
///   "code": "VALIDATION_ERROR",
///   "message": "The given data was invalid.",
///   "errors": { "items": ["items is required"] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(skip)]
    pub http_status: StatusCode,

    /// `"fail"` for rejected orders, `"error"` for everything else
    pub status: &'static str,

    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Validation messages per field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (422)
    ValidationError,

    /// Request could not be parsed (400)
    InvalidRequest,

    /// Missing, invalid, expired or revoked token (401)
    Unauthenticated,

    /// Resource not found (404)
    NotFound,

    /// Order references a product that no longer exists (422)
    ProductNotFound,

    /// Order contains unavailable products (422)
    ProductsOutOfStock,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error with `status: "error"`.
    pub fn new(http_status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            http_status,
            status: "error",
            code,
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error from one or more failed rules.
    pub fn validation(errors: impl IntoIterator<Item = ValidationError>) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for err in errors {
            fields
                .entry(err.field().to_string())
                .or_default()
                .push(err.to_string());
        }

        ApiError {
            errors: Some(fields),
            ..ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ValidationError,
                "The given data was invalid.",
            )
        }
    }

    /// Creates a validation error carrying a free-form message for one field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError {
            errors: Some(BTreeMap::from([(field.to_string(), vec![message.clone()])])),
            ..ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ValidationError, message)
        }
    }

    /// Creates a 401 error.
    pub fn unauthenticated() -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated, "Unauthenticated.")
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let database = |message: &str| {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, message)
        };

        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation([ValidationError::Duplicate { field, value }])
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::field("reference", "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                database("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                database("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                database("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                database("Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                database("Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                database("Database operation failed")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation([err])
    }
}

/// Rejected orders use the `fail` envelope.
impl From<OrderCreationError> for ApiError {
    fn from(err: OrderCreationError) -> Self {
        let code = match err {
            OrderCreationError::ProductNotFound { .. } => ErrorCode::ProductNotFound,
            OrderCreationError::ProductsOutOfStock { .. } => ErrorCode::ProductsOutOfStock,
        };

        ApiError {
            status: "fail",
            ..ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, code, err.to_string())
        }
    }
}

impl From<OrderServiceError> for ApiError {
    fn from(err: OrderServiceError) -> Self {
        match err {
            OrderServiceError::Rejected(e) => e.into(),
            OrderServiceError::Store(e) => e.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "Rejected bearer token");
        ApiError::unauthenticated()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), ErrorCode::InvalidRequest, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(rejection.status(), ErrorCode::InvalidRequest, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(rejection.status(), ErrorCode::InvalidRequest, rejection.body_text())
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

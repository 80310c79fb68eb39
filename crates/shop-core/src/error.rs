//! # Error Types
//!
//! Domain-specific error types for shop-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shop-core errors (this file)                                          │
//! │  ├── OrderCreationError - Business rejection of a new order            │
//! │  └── ValidationError    - Input validation failures                    │
//! │                                                                         │
//! │  shop-db errors (separate crate)                                       │
//! │  └── DbError            - Database operation failures                  │
//! │                                                                         │
//! │  shop-api errors (app)                                                 │
//! │  └── ApiError           - What HTTP clients see (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError / OrderCreationError / DbError → ApiError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Order Creation Error
// =============================================================================

/// Business rule failures raised while creating an order.
///
/// Both variants are expected outcomes the caller can act on. They are
/// detected inside the order transaction, which is rolled back before the
/// error is returned, so nothing is ever partially written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderCreationError {
    /// A referenced product is missing from the catalog.
    ///
    /// ## When This Occurs
    /// - The product was deleted between request validation and the order
    ///   transaction's read
    /// - The request bypassed the HTTP layer's existence check
    #[error("Product not found: {id}")]
    ProductNotFound { id: ProductId },

    /// One or more requested products are not in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Submit order [{C, 1}, {D, 1}, {E, 2}]
    ///      │
    ///      ▼
    /// Scan every line: C out, D ok, E out
    ///      │
    ///      ▼
    /// ProductsOutOfStock { names: ["C", "E"] }
    ///      │
    ///      ▼
    /// Client shows: "Some products are out of stock: C, E"
    /// ```
    #[error("Some products are out of stock: {}", .names.join(", "))]
    ProductsOutOfStock { names: Vec<String> },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email, malformed price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Confirmation field doesn't match (e.g., password confirmation).
    #[error("{field} confirmation does not match")]
    Mismatch { field: String },

    /// Referenced record doesn't exist (e.g., unknown product id).
    #[error("{field} references a missing record: {value}")]
    UnknownReference { field: String, value: String },

    /// Duplicate value (e.g., email already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    ///
    /// Used by the HTTP layer to group messages per field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Mismatch { field }
            | ValidationError::UnknownReference { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }

    /// Re-targets the error at another field, keeping the rule that failed.
    ///
    /// Shared validators report a generic field name (`price`); callers
    /// that validate a specific input (`price_start`) rename it.
    pub fn for_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Mismatch { field }
            | ValidationError::UnknownReference { field, .. }
            | ValidationError::Duplicate { field, .. } => *field = name,
        }
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_message_lists_every_name() {
        let err = OrderCreationError::ProductsOutOfStock {
            names: vec!["Pork ribs".to_string(), "Oak chair".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Some products are out of stock: Pork ribs, Oak chair"
        );
    }

    #[test]
    fn test_product_not_found_message() {
        let err = OrderCreationError::ProductNotFound { id: 999 };
        assert_eq!(err.to_string(), "Product not found: 999");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::TooLong {
            field: "comment".to_string(),
            max: 1024,
        };
        assert_eq!(err.to_string(), "comment must be at most 1024 characters");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::Mismatch {
            field: "password".to_string(),
        };
        assert_eq!(err.field(), "password");
    }

    #[test]
    fn test_for_field_keeps_the_rule() {
        let err = ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "not a number".to_string(),
        }
        .for_field("price_end");

        assert_eq!(err.field(), "price_end");
        assert_eq!(err.to_string(), "price_end has invalid format: not a number");
    }
}

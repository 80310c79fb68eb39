//! # Validation Module
//!
//! Input validation utilities for the shop backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (shop-api)                                      │
//! │  ├── Type validation (JSON / query deserialization)                    │
//! │  └── Existence checks against the store (user, products)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, formats, limits                                          │
//! │  └── Order size rules (≤ 10 lines, ≤ 100 units)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use shop_core::validation::{validate_email, validate_count};
//!
//! validate_email("jane@example.com").unwrap();
//! validate_count("items.0.count", 5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::OrderItemRequest;
use crate::{MAX_COMMENT_LENGTH, MAX_ORDER_ITEM_COUNT, MAX_ORDER_LINES, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LENGTH: usize = 255;
const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Lamb shoulder").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LENGTH)
}

/// Validates a user's display name (1 to 255 characters).
pub fn validate_user_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_NAME_LENGTH)
}

/// Validates an order comment.
///
/// A comment is optional, but when present it must hold 1 to 1024
/// characters.
pub fn validate_comment(comment: &str) -> ValidationResult<()> {
    if comment.is_empty() {
        return Err(ValidationError::TooShort {
            field: "comment".to_string(),
            min: 1,
        });
    }

    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ValidationError::TooLong {
            field: "comment".to_string(),
            max: MAX_COMMENT_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_email;
///
/// assert!(validate_email("jane@example.com").is_ok());
/// assert!(validate_email("jane@localhost").is_err());
/// assert!(validate_email("jane.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    match domain.rfind('.') {
        Some(dot) if dot > 0 && dot < domain.len() - 1 && !domain.starts_with('.') => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a new password and its confirmation.
pub fn validate_password(password: &str, confirmation: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if password != confirmation {
        return Err(ValidationError::Mismatch {
            field: "password".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number: an optional leading `+` followed by 10 to 15
/// digits.
///
/// ## Example
/// ```rust
/// use shop_core::validation::validate_phone;
///
/// assert!(validate_phone("+380501234567").is_ok());
/// assert!(validate_phone("0501234567").is_ok());
/// assert!(validate_phone("050-123-45-67").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 10 to 15 digits with an optional leading +".to_string(),
        })
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(field: &str, query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use shop_core::{money::Money, validation::validate_price};
///
/// assert!(validate_price(Money::from_cents(1099)).is_ok());
/// assert!(validate_price(Money::zero()).is_ok());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line count: at least 1.
pub fn validate_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a requested page size (1 to 100).
pub fn validate_page_size(per_page: u32) -> ValidationResult<()> {
    if per_page == 0 || per_page > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "per_page".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the item list of an order.
///
/// ## Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  items = [{product_id, count}, ...]                                     │
/// │       │                                                                 │
/// │       ├── empty?                → Error: items is required             │
/// │       ├── any count < 1?        → Error: items.N.count must be positive│
/// │       ├── more than 10 lines?   → Error: items out of range            │
/// │       ├── Σ count > 100?        → Error: items out of range            │
/// │       └── OK                                                            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The same product may appear on more than one line. Each line counts
/// toward the line limit.
pub fn validate_order_items(items: &[OrderItemRequest]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for (index, item) in items.iter().enumerate() {
        validate_count(&format!("items.{index}.count"), item.count)?;
    }

    if items.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    // Counts are positive, so overflow can only come from absurd input.
    let total = items
        .iter()
        .try_fold(0i64, |acc, item| acc.checked_add(item.count));
    match total {
        Some(total) if total <= MAX_ORDER_ITEM_COUNT => Ok(()),
        _ => Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEM_COUNT,
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(counts: &[i64]) -> Vec<OrderItemRequest> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| OrderItemRequest {
                product_id: i as i64 + 1,
                count,
            })
            .collect()
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Beef brisket").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_comment() {
        assert!(validate_comment("Leave at the door").is_ok());
        assert!(validate_comment("").is_err());
        assert!(validate_comment(&"ж".repeat(1024)).is_ok());
        assert!(validate_comment(&"ж".repeat(1025)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("@b.co").is_err());
        assert!(validate_email("a@@b.co").is_err());
        assert!(validate_email("a@b.").is_err());
        assert!(validate_email("a@.co").is_err());
        assert!(validate_email("a b@c.co").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1", "secret1").is_ok());
        assert_eq!(
            validate_password("short", "short"),
            Err(ValidationError::TooShort {
                field: "password".to_string(),
                min: 6
            })
        );
        assert_eq!(
            validate_password("secret1", "secret2"),
            Err(ValidationError::Mismatch {
                field: "password".to_string()
            })
        );
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+123456789012345").is_ok());
        assert!(validate_phone("123456789").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
        assert!(validate_phone("++1234567890").is_err());
    }

    #[test]
    fn test_validate_order_items_limits() {
        assert!(validate_order_items(&lines(&[2, 3])).is_ok());
        assert!(validate_order_items(&lines(&[10; 10])).is_ok());

        // 11 lines
        assert!(validate_order_items(&lines(&[1; 11])).is_err());
        // 101 units
        assert!(validate_order_items(&lines(&[100, 1])).is_err());
        // empty
        assert!(validate_order_items(&[]).is_err());
    }

    #[test]
    fn test_validate_order_items_names_offending_line() {
        let err = validate_order_items(&lines(&[1, 0])).unwrap_err();
        assert_eq!(err.field(), "items.1.count");
    }

    #[test]
    fn test_validate_order_items_total_count_keyed_on_items() {
        let err = validate_order_items(&lines(&[60, 41])).unwrap_err();
        assert_eq!(err.field(), "items");
        assert!(matches!(err, ValidationError::OutOfRange { max: 100, .. }));
    }

    #[test]
    fn test_validate_page_size() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("name", "  pork ").unwrap(), "pork");
        assert!(validate_search_query("name", &"q".repeat(101)).is_err());
    }
}

//! # shop-core: Pure Business Logic for the Shop Backend
//!
//! This crate contains the domain types and the order pricing rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shop Backend Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP clients (JSON)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shop-api (axum)                              │   │
//! │  │    register, login, products, orders                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shop-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │price_order│  │   rules   │  │   │
//! │  │   │  Order    │  │  rounding │  │ stock chk │  │  limits   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shop-db (Database Layer)                     │   │
//! │  │         SQLite queries, transactions, migrations               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderItem, requests, paging)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Stock check and total calculation for a new order
//! - [`error`] - Domain error types
//! - [`validation`] - Boundary validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use shop_core::money::Money;
//!
//! let price = Money::parse_decimal("12.50").unwrap();
//! let line = price.multiply_quantity(3); // 37.50
//!
//! assert_eq!(line.cents(), 3750);
//! assert_eq!(line.round_to_units(), 38);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{OrderCreationError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum total number of units across all lines of one order.
pub const MAX_ORDER_ITEM_COUNT: i64 = 100;

/// Maximum number of line entries in one order.
pub const MAX_ORDER_LINES: usize = 10;

/// Maximum length of an order comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 1024;

/// Page size used when a listing request doesn't specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a listing request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

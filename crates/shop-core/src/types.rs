//! # Domain Types
//!
//! Core domain types used throughout the shop backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  order_id (FK)  │       │
//! │  │  name           │   │  user_id (FK)   │   │  product_id     │       │
//! │  │  price_cents    │   │  total_price    │   │  count          │       │
//! │  │  in_stock       │   │  status         │   │  price_cents ❄  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderRequest   │   │    NewOrder     │   │    Page<T>      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  validated      │──►│  priced, ready  │   │  data           │       │
//! │  │  client input   │   │  to persist     │   │  meta           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = snapshot, frozen at order time                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted entity has an integer id assigned by the store on insert.
//! `New*` types are the not-yet-persisted form and carry no id.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_comment, validate_order_items, validate_page_size, validate_price,
    validate_product_name, ValidationResult,
};
use crate::DEFAULT_PAGE_SIZE;

// =============================================================================
// Identifiers
// =============================================================================

/// Store-assigned product identifier.
pub type ProductId = i64;

/// Store-assigned user identifier.
pub type UserId = i64;

/// Store-assigned order identifier.
pub type OrderId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Read-only from the order core's point of view: an order only looks at
/// `name`, `price_cents` and `in_stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Unit price in cents.
    pub price_cents: i64,
    pub in_stock: bool,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A product that has not been stored yet.
///
/// ## Example
/// ```rust
/// use shop_core::{Money, NewProduct};
///
/// let product = NewProduct::new("Pork ribs", Money::from_cents(1299))
///     .unwrap()
///     .with_category("pork")
///     .with_in_stock(false);
///
/// assert_eq!(product.category.as_deref(), Some("pork"));
/// assert!(!product.in_stock);
/// assert!(NewProduct::new("", Money::from_cents(100)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Money,
    pub in_stock: bool,
}

impl NewProduct {
    /// Creates an in-stock product, rejecting a blank name or negative price.
    pub fn new(name: impl Into<String>, price: Money) -> ValidationResult<Self> {
        let name = name.into();
        validate_product_name(&name)?;
        validate_price(price)?;

        Ok(NewProduct {
            name: name.trim().to_string(),
            description: None,
            category: None,
            price,
            in_stock: true,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle tag of an order.
///
/// Orders are always created as `New`. The other states exist in the
/// schema but no transition is performed by this backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// The value stored in the `orders.status` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub comment: Option<String>,
    /// Sum of the line totals, rounded to whole units.
    pub total_price: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of a persisted order.
/// Uses snapshot pattern to freeze the product price at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub count: i64,
    /// Unit price in cents at time of order (frozen).
    pub price_cents: i64,
}

impl OrderItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns unit price × count.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price().multiply_quantity(self.count)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Order Request
// =============================================================================

/// One requested line: a product and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub count: i64,
}

/// A structurally valid order submitted by a client.
///
/// Constructed only through [`OrderRequest::new`], so every instance has
/// a non-empty item list within the size limits, positive counts and a
/// comment of acceptable length. Whether the referenced user and products
/// exist is checked by the caller against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    user_id: UserId,
    comment: Option<String>,
    items: Vec<OrderItemRequest>,
}

impl OrderRequest {
    pub fn new(
        user_id: UserId,
        comment: Option<String>,
        items: Vec<OrderItemRequest>,
    ) -> ValidationResult<Self> {
        if let Some(comment) = &comment {
            validate_comment(comment)?;
        }
        validate_order_items(&items)?;

        Ok(OrderRequest {
            user_id,
            comment,
            items,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn items(&self) -> &[OrderItemRequest] {
        &self.items
    }

    /// Distinct product ids referenced by the request, in ascending order.
    pub fn product_ids(&self) -> BTreeSet<ProductId> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}

// =============================================================================
// New Order (priced, not yet persisted)
// =============================================================================

/// An order that passed the stock check and has been priced.
///
/// Produced by [`crate::pricing::price_order`] and written by the order
/// repository. Holds exactly one item per requested line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub comment: Option<String>,
    pub total_price: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<NewOrderItem>,
}

/// A priced line of a [`NewOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub count: i64,
    /// Snapshot of the product's unit price.
    pub price: Money,
}

// =============================================================================
// User
// =============================================================================

/// A registered user. The password hash never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Filters
// =============================================================================

/// Product search filters. All conditions are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Substring of the product name.
    pub name: Option<String>,
    /// Substring of the category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub price_start: Option<Money>,
    /// Inclusive upper price bound.
    pub price_end: Option<Money>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
}

// =============================================================================
// Pagination
// =============================================================================

/// Which page of a listing to return (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Builds a page request, applying defaults for missing values.
    ///
    /// ## Example
    /// ```rust
    /// use shop_core::PageRequest;
    ///
    /// let page = PageRequest::new(Some(3), Some(20)).unwrap();
    /// assert_eq!(page.offset(), 40);
    ///
    /// let default = PageRequest::new(None, None).unwrap();
    /// assert_eq!((default.page(), default.per_page()), (1, 10));
    ///
    /// assert!(PageRequest::new(Some(1), Some(500)).is_err());
    /// ```
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> ValidationResult<Self> {
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE);
        validate_page_size(per_page)?;

        let page = match page {
            Some(0) => {
                return Err(ValidationError::MustBePositive {
                    field: "page".to_string(),
                })
            }
            Some(page) => page,
            None => 1,
        };

        Ok(PageRequest { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Rows to skip (SQL `OFFSET`).
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    /// Rows to return (SQL `LIMIT`).
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    /// Never less than 1, even for an empty listing.
    pub last_page: i64,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let per_page = i64::from(request.per_page);
        let last_page = ((total + per_page - 1) / per_page).max(1);

        Page {
            data,
            meta: PageMeta {
                current_page: request.page,
                per_page: request.per_page,
                total,
                last_page,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: ProductId, count: i64) -> OrderItemRequest {
        OrderItemRequest { product_id, count }
    }

    #[test]
    fn test_order_request_collects_distinct_product_ids() {
        let request =
            OrderRequest::new(1, None, vec![item(3, 1), item(1, 2), item(3, 4)]).unwrap();

        let ids: Vec<_> = request.product_ids().into_iter().collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(request.items().len(), 3);
    }

    #[test]
    fn test_order_request_rejects_bad_input() {
        assert!(OrderRequest::new(1, None, vec![]).is_err());
        assert!(OrderRequest::new(1, None, vec![item(1, 0)]).is_err());
        assert!(OrderRequest::new(1, Some(String::new()), vec![item(1, 1)]).is_err());
        assert!(OrderRequest::new(1, Some("x".repeat(1025)), vec![item(1, 1)]).is_err());
        assert!(OrderRequest::new(1, Some("x".repeat(1024)), vec![item(1, 1)]).is_ok());
    }

    #[test]
    fn test_new_product_trims_name() {
        let product = NewProduct::new("  Oak chair ", Money::from_cents(4500)).unwrap();
        assert_eq!(product.name, "Oak chair");
        assert!(product.in_stock);
    }

    #[test]
    fn test_new_product_rejects_negative_price() {
        assert!(NewProduct::new("Oak chair", Money::from_cents(-1)).is_err());
        assert!(NewProduct::new("Free sample", Money::zero()).is_ok());
    }

    #[test]
    fn test_page_meta() {
        let request = PageRequest::new(Some(2), Some(10)).unwrap();
        let page = Page::new(vec![1, 2, 3], request, 23);
        assert_eq!(page.meta.last_page, 3);
        assert_eq!(page.meta.current_page, 2);

        let empty: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.meta.last_page, 1);
    }

    #[test]
    fn test_page_request_rejects_zero_page() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
    }

    #[test]
    fn test_order_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        assert_eq!(OrderStatus::default(), OrderStatus::New);
        assert_eq!(OrderStatus::New.as_str(), "new");
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            count: 3,
            price_cents: 1250,
        };
        assert_eq!(item.line_total().cents(), 3750);
    }
}

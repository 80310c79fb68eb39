//! # Order Pricing
//!
//! The decision half of order creation: given a request and the catalog
//! rows it references, either produce a priced [`NewOrder`] or reject it.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderRequest + catalog lookup (id → Product)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for each line, in request order:                                      │
//! │       ├── product missing?  → return ProductNotFound { id }            │
//! │       ├── out of stock?     → remember name, keep scanning             │
//! │       └── in stock          → total += price × count                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  any out of stock?          → ProductsOutOfStock { names }             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NewOrder { total_price: round(total), items: one per line }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The function is pure. Reading the catalog and writing the result happen
//! in the caller's transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::OrderCreationError;
use crate::money::Money;
use crate::types::{NewOrder, NewOrderItem, OrderRequest, OrderStatus, Product, ProductId};

/// Prices an order against the current catalog state.
///
/// ## Rules
/// - A line whose product is absent from `catalog` fails the whole order
///   with [`OrderCreationError::ProductNotFound`] immediately.
/// - Out-of-stock products are collected across every line and reported
///   together, one name per out-of-stock line.
/// - Line totals are exact in cents. Only the order total is rounded, to
///   whole units, half away from zero.
/// - Every line becomes an item carrying the product's full-precision unit
///   price.
///
/// ## Example
/// ```rust
/// use std::collections::HashMap;
/// use shop_core::{pricing::price_order, OrderItemRequest, OrderRequest, Product};
///
/// let product = Product {
///     id: 1,
///     name: "Turkey breast".to_string(),
///     description: None,
///     category: Some("turkey".to_string()),
///     price_cents: 1000,
///     in_stock: true,
/// };
/// let catalog = HashMap::from([(1, product)]);
/// let request = OrderRequest::new(
///     7,
///     None,
///     vec![OrderItemRequest { product_id: 1, count: 3 }],
/// )
/// .unwrap();
///
/// let order = price_order(&request, &catalog, chrono::Utc::now()).unwrap();
/// assert_eq!(order.total_price, 30);
/// assert_eq!(order.items.len(), 1);
/// ```
pub fn price_order(
    request: &OrderRequest,
    catalog: &HashMap<ProductId, Product>,
    now: DateTime<Utc>,
) -> Result<NewOrder, OrderCreationError> {
    let mut total = Money::zero();
    let mut out_of_stock: Vec<String> = Vec::new();
    let mut items = Vec::with_capacity(request.items().len());

    for line in request.items() {
        let product = catalog
            .get(&line.product_id)
            .ok_or(OrderCreationError::ProductNotFound {
                id: line.product_id,
            })?;

        if !product.in_stock {
            out_of_stock.push(product.name.clone());
            continue;
        }

        total += product.price().multiply_quantity(line.count);
        items.push(NewOrderItem {
            product_id: product.id,
            count: line.count,
            price: product.price(),
        });
    }

    if !out_of_stock.is_empty() {
        return Err(OrderCreationError::ProductsOutOfStock {
            names: out_of_stock,
        });
    }

    Ok(NewOrder {
        user_id: request.user_id(),
        comment: request.comment().map(str::to_string),
        total_price: total.round_to_units(),
        status: OrderStatus::New,
        created_at: now,
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

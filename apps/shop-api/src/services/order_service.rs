//! # Order Creation Service
//!
//! Turns a validated [`OrderRequest`] into a persisted order with its
//! items, or into a typed rejection with nothing written.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     create_order(request)                               │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── find_by_ids_with(tx, distinct product ids)     one read         │
//! │    │                                                                    │
//! │    ├── price_order(request, catalog, now)             pure             │
//! │    │     ├── missing product   → ProductNotFound { id }   ─┐           │
//! │    │     └── any out of stock  → ProductsOutOfStock {..}  ─┤           │
//! │    │                                                       │           │
//! │    ├── insert_order(tx, new_order)                         │           │
//! │    ├── insert_order_item(tx, ...) × lines                  │           │
//! │    │                                                       ▼           │
//! │  COMMIT → Ok(Order)                              ROLLBACK → Err(..)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller has already checked that the user and every product exist
//! and that the request is within the size limits. The stock check is a
//! single read-then-write inside the transaction. Two concurrent orders can
//! both see a product as in stock and both succeed.

use chrono::Utc;
use shop_core::pricing::price_order;
use shop_core::{Order, OrderCreationError, OrderRequest};
use shop_db::{Database, DbError, OrderRepository, ProductRepository, Tx};
use thiserror::Error;
use tracing::{error, info, warn};

/// Why an order was not created.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    /// Business rejection. The client can fix the request and retry.
    #[error(transparent)]
    Rejected(#[from] OrderCreationError),

    /// Infrastructure failure.
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Order creation service.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
}

impl OrderService {
    /// Create a new order service.
    pub fn new(db: Database) -> Self {
        OrderService { db }
    }

    /// Creates an order and all of its items in one transaction.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The persisted order with its generated id
    /// * `Err(Rejected(ProductNotFound))` - A product vanished, nothing written
    /// * `Err(Rejected(ProductsOutOfStock))` - Every unavailable name, nothing written
    /// * `Err(Store(_))` - Database failure, nothing written
    pub async fn create_order(&self, request: OrderRequest) -> Result<Order, OrderServiceError> {
        let user_id = request.user_id();
        info!(user_id, lines = request.items().len(), "Creating order");

        let result: Result<Order, OrderServiceError> = self
            .db
            .orders()
            .run_in_transaction(move |tx| {
                Box::pin(async move { Self::create_order_in(tx, &request).await })
            })
            .await;

        match &result {
            Ok(order) => info!(
                order_id = order.id,
                user_id,
                total_price = order.total_price,
                "Order created"
            ),
            Err(OrderServiceError::Rejected(reason)) => {
                warn!(user_id, %reason, "Order rejected")
            }
            Err(OrderServiceError::Store(e)) => error!(user_id, error = %e, "Order creation failed"),
        }

        result
    }

    /// Runs the order workflow on an open transaction.
    ///
    /// Does not commit. On `Err` the caller must roll back, which
    /// [`OrderRepository::run_in_transaction`] does.
    pub async fn create_order_in(
        tx: &mut Tx,
        request: &OrderRequest,
    ) -> Result<Order, OrderServiceError> {
        let catalog = ProductRepository::find_by_ids_with(&mut **tx, &request.product_ids()).await?;

        let new_order = price_order(request, &catalog, Utc::now())?;

        let order = OrderRepository::insert_order(&mut **tx, &new_order).await?;
        for item in &new_order.items {
            OrderRepository::insert_order_item(&mut **tx, order.id, item).await?;
        }

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::{Money, NewProduct, OrderItemRequest, OrderStatus, ProductId, UserId};
    use shop_db::{DbConfig, NewUser};

    struct Fixture {
        db: Database,
        service: OrderService,
        user_id: UserId,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert(&NewUser {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                phone: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            service: OrderService::new(db.clone()),
            db,
            user_id: user.id,
        }
    }

    async fn product(db: &Database, name: &str, cents: i64, in_stock: bool) -> ProductId {
        let new = NewProduct::new(name, Money::from_cents(cents))
            .unwrap()
            .with_in_stock(in_stock);
        db.products().insert(&new).await.unwrap().id
    }

    fn request(user_id: UserId, lines: &[(ProductId, i64)]) -> OrderRequest {
        let items = lines
            .iter()
            .map(|&(product_id, count)| OrderItemRequest { product_id, count })
            .collect();
        OrderRequest::new(user_id, None, items).unwrap()
    }

    async fn row_counts(db: &Database) -> (i64, i64) {
        (
            db.orders().count().await.unwrap(),
            db.orders().count_items().await.unwrap(),
        )
    }

    #[tokio::test]
    async fn test_creates_order_with_items() {
        let f = fixture().await;
        let a = product(&f.db, "A", 10_000, true).await;
        let b = product(&f.db, "B", 20_000, true).await;

        let order = f
            .service
            .create_order(request(f.user_id, &[(a, 2), (b, 3)]))
            .await
            .unwrap();

        assert_eq!(order.total_price, 800);
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.user_id, f.user_id);
        assert!(order.completed_at.is_none());

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!((items[0].product_id, items[0].count), (a, 2));
        assert_eq!((items[1].product_id, items[1].count), (b, 3));
        assert_eq!(items[0].price_cents, 10_000);
        assert_eq!(items[1].price_cents, 20_000);
    }

    #[tokio::test]
    async fn test_keeps_comment() {
        let f = fixture().await;
        let a = product(&f.db, "A", 1_000, true).await;

        let request = OrderRequest::new(
            f.user_id,
            Some("Leave at the door".to_string()),
            vec![OrderItemRequest { product_id: a, count: 1 }],
        )
        .unwrap();
        let order = f.service.create_order(request).await.unwrap();

        let stored = f.db.orders().get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.comment.as_deref(), Some("Leave at the door"));
    }

    #[tokio::test]
    async fn test_out_of_stock_writes_nothing() {
        let f = fixture().await;
        let c = product(&f.db, "C", 500, false).await;
        let d = product(&f.db, "D", 700, true).await;

        let err = f
            .service
            .create_order(request(f.user_id, &[(c, 1), (d, 1)]))
            .await
            .unwrap_err();

        match err {
            OrderServiceError::Rejected(OrderCreationError::ProductsOutOfStock { names }) => {
                assert_eq!(names, vec!["C".to_string()]);
            }
            other => panic!("expected ProductsOutOfStock, got {other:?}"),
        }
        assert_eq!(row_counts(&f.db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_missing_product_writes_nothing() {
        let f = fixture().await;
        let a = product(&f.db, "A", 500, true).await;

        let err = f
            .service
            .create_order(request(f.user_id, &[(a, 1), (999, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderServiceError::Rejected(OrderCreationError::ProductNotFound { id: 999 })
        ));
        assert_eq!(row_counts(&f.db).await, (0, 0));
    }

    #[tokio::test]
    async fn test_repeated_failure_leaves_store_unchanged() {
        let f = fixture().await;
        let a = product(&f.db, "A", 500, true).await;
        let c = product(&f.db, "C", 500, false).await;

        let placed = f.service.create_order(request(f.user_id, &[(a, 1)])).await.unwrap();
        let before = row_counts(&f.db).await;

        for _ in 0..2 {
            let err = f
                .service
                .create_order(request(f.user_id, &[(a, 1), (c, 2)]))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                OrderServiceError::Rejected(OrderCreationError::ProductsOutOfStock { .. })
            ));
            assert_eq!(row_counts(&f.db).await, before);
        }

        for _ in 0..2 {
            let err = f
                .service
                .create_order(request(f.user_id, &[(a, 1), (999, 1)]))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                OrderServiceError::Rejected(OrderCreationError::ProductNotFound { id: 999 })
            ));
            assert_eq!(row_counts(&f.db).await, before);
        }

        assert!(f.db.orders().get_by_id(placed.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_item_price_is_a_snapshot() {
        let f = fixture().await;
        let a = product(&f.db, "A", 1_999, true).await;

        let order = f.service.create_order(request(f.user_id, &[(a, 3)])).await.unwrap();
        assert_eq!(order.total_price, 60);

        sqlx::query("UPDATE products SET price_cents = 5000 WHERE id = ?1")
            .bind(a)
            .execute(f.db.pool())
            .await
            .unwrap();

        let items = f.db.orders().items(order.id).await.unwrap();
        assert_eq!(items[0].price(), Money::from_cents(1_999));
        assert_eq!(items[0].line_total(), Money::from_cents(5_997));

        let stored = f.db.orders().get_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(stored.total_price, 60);
    }

    #[tokio::test]
    async fn test_fractional_total_rounds_half_away_from_zero() {
        let f = fixture().await;
        let half = product(&f.db, "Half", 50, true).await;
        let less = product(&f.db, "Less", 49, true).await;

        let up = f.service.create_order(request(f.user_id, &[(half, 1)])).await.unwrap();
        let down = f.service.create_order(request(f.user_id, &[(less, 1)])).await.unwrap();

        assert_eq!(up.total_price, 1);
        assert_eq!(down.total_price, 0);
    }

    #[tokio::test]
    async fn test_create_order_in_caller_transaction() {
        let f = fixture().await;
        let a = product(&f.db, "A", 1_000, true).await;
        let req = request(f.user_id, &[(a, 2)]);

        // The caller decides to abort after the order was written
        let result: Result<(), OrderServiceError> = f
            .db
            .orders()
            .run_in_transaction(move |tx| {
                Box::pin(async move {
                    let order = OrderService::create_order_in(tx, &req).await?;
                    assert_eq!(order.total_price, 20);
                    Err(OrderServiceError::Store(DbError::Internal(
                        "caller aborted".to_string(),
                    )))
                })
            })
            .await;

        assert!(matches!(result, Err(OrderServiceError::Store(DbError::Internal(_)))));
        assert_eq!(row_counts(&f.db).await, (0, 0));
    }
}

//! # Order Repository
//!
//! Database operations for orders and order items.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Creation Transaction                           │
//! │                                                                         │
//! │  run_in_transaction(|tx| ...)                                          │
//! │       │                                                                 │
//! │       ├── BEGIN                                                         │
//! │       │                                                                 │
//! │       ├── closure(&mut tx)                                             │
//! │       │     ├── read products        (&mut **tx)                       │
//! │       │     ├── insert_order         (&mut **tx)                       │
//! │       │     └── insert_order_item ×N (&mut **tx)                       │
//! │       │                                                                 │
//! │       ├── Ok(value)  → COMMIT   → Ok(value)                            │
//! │       └── Err(error) → ROLLBACK → Err(error)                            │
//! │                                                                         │
//! │  Either the order and all of its items exist, or none of them do.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The transaction handle is always explicit. Nothing here looks up an
//! ambient connection.

use futures_util::future::BoxFuture;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::Tx;
use shop_core::{
    NewOrder, NewOrderItem, Order, OrderFilter, OrderId, OrderItem, OrderWithItems, Page,
    PageRequest,
};

const ORDER_COLUMNS: &str =
    "SELECT id, user_id, comment, total_price, status, created_at, completed_at FROM orders";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Transactional Writes
    // =========================================================================

    /// Runs `f` inside one database transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. The
    /// error from `f` is returned unchanged. Failing to begin or commit is
    /// reported as [`DbError::TransactionFailed`] converted into `E`.
    ///
    /// SQLite transactions are serializable, so the reads and writes made
    /// through the handle see one consistent snapshot.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let order = db
    ///     .orders()
    ///     .run_in_transaction(move |tx| {
    ///         Box::pin(async move {
    ///             let order = OrderRepository::insert_order(&mut **tx, &new_order).await?;
    ///             Ok::<_, DbError>(order)
    ///         })
    ///     })
    ///     .await?;
    /// ```
    pub async fn run_in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<T, E>> + Send,
        T: Send,
        E: From<DbError> + Send,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| E::from(DbError::TransactionFailed(e.to_string())))?;

        debug!("Transaction started");

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| E::from(DbError::TransactionFailed(e.to_string())))?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transaction rollback failed");
                } else {
                    debug!("Transaction rolled back");
                }
                Err(err)
            }
        }
    }

    /// Inserts the order row and returns it with its generated id.
    ///
    /// Items are not written here, see [`Self::insert_order_item`].
    pub async fn insert_order(conn: &mut SqliteConnection, order: &NewOrder) -> DbResult<Order> {
        debug!(
            user_id = order.user_id,
            total_price = order.total_price,
            lines = order.items.len(),
            "Inserting order"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO orders (user_id, comment, total_price, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(order.user_id)
        .bind(&order.comment)
        .bind(order.total_price)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(Order {
            id: result.last_insert_rowid(),
            user_id: order.user_id,
            comment: order.comment.clone(),
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
            completed_at: None,
        })
    }

    /// Inserts one line of an order.
    ///
    /// ## Snapshot Pattern
    /// The unit price is copied onto the item, so later catalog price
    /// changes don't alter the order's history.
    pub async fn insert_order_item(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> DbResult<OrderItem> {
        debug!(order_id, product_id = item.product_id, count = item.count, "Adding order item");

        let result = sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, count, price_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.count)
        .bind(item.price.cents())
        .execute(&mut *conn)
        .await?;

        Ok(OrderItem {
            id: result.last_insert_rowid(),
            order_id,
            product_id: item.product_id,
            count: item.count,
            price_cents: item.price.cents(),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: OrderId) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!("{ORDER_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets all items of an order, in insertion order.
    pub async fn items(&self, order_id: OrderId) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, count, price_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets an order together with its items.
    pub async fn get_with_items(&self, id: OrderId) -> DbResult<Option<OrderWithItems>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.items(order.id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// Lists orders, newest first.
    pub async fn list(&self, filter: &OrderFilter, page: PageRequest) -> DbResult<Page<Order>> {
        debug!(?filter, page = page.page(), per_page = page.per_page(), "Listing orders");

        let mut count_query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM orders");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(ORDER_COLUMNS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let orders: Vec<Order> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(orders, page, total))
    }

    /// Counts all orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all order items.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    if let Some(user_id) = filter.user_id {
        query.push(" WHERE user_id = ").push_bind(user_id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

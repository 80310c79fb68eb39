//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Batch lookup by id for order creation
//! - Filtered, paginated listing
//! - Insert (seeding and tests only, there is no catalog management API)
//!
//! ## Batch Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order lines: [{3, 2}, {7, 1}, {3, 1}, {999, 1}]                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  distinct ids {3, 7, 999}                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM products WHERE id IN (?, ?, ?)   ← one round trip     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { 3 → Product, 7 → Product }    (999 simply absent)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::like_pattern;
use shop_core::{NewProduct, Page, PageRequest, Product, ProductFilter, ProductId};

const PRODUCT_COLUMNS: &str = "SELECT id, name, description, category, price_cents, in_stock FROM products";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.search(&ProductFilter::default(), PageRequest::default()).await?;
/// let product = repo.get_by_id(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Fetches the given products in one query, keyed by id.
    ///
    /// Ids with no matching row are absent from the map, not an error.
    /// Runs on the caller's connection so the read belongs to its
    /// transaction.
    pub async fn find_by_ids_with(
        conn: &mut SqliteConnection,
        ids: &BTreeSet<ProductId>,
    ) -> DbResult<HashMap<ProductId, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!(count = ids.len(), "Looking up products by id");

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(PRODUCT_COLUMNS);
        query.push(" WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let products: Vec<Product> = query.build_query_as().fetch_all(&mut *conn).await?;

        debug!(found = products.len(), "Product lookup complete");
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Pool-backed variant of [`Self::find_by_ids_with`].
    pub async fn find_by_ids(
        &self,
        ids: &BTreeSet<ProductId>,
    ) -> DbResult<HashMap<ProductId, Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_ids_with(&mut *conn, ids).await
    }

    /// Lists products matching `filter`, one page at a time.
    ///
    /// ## Filters
    /// - `name`, `category`: case-insensitive substring match
    /// - `price_start`, `price_end`: inclusive bounds
    ///
    /// Results are ordered by id so pages are stable.
    pub async fn search(&self, filter: &ProductFilter, page: PageRequest) -> DbResult<Page<Product>> {
        debug!(?filter, page = page.page(), per_page = page.per_page(), "Searching products");

        let mut count_query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM products");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(PRODUCT_COLUMNS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let products: Vec<Product> = query.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = products.len(), total, "Search returned products");
        Ok(Page::new(products, page, total))
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{PRODUCT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its generated id.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, price = %product.price, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, category, price_cents, in_stock, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price.cents())
        .bind(product.in_stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price_cents: product.price.cents(),
            in_stock: product.in_stock,
        })
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends the WHERE clause for `filter`. Empty strings don't filter.
fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(name) = filter.name.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(" AND name LIKE ")
            .push_bind(like_pattern(name))
            .push(" ESCAPE '\\'");
    }

    if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(" AND category LIKE ")
            .push_bind(like_pattern(category))
            .push(" ESCAPE '\\'");
    }

    if let Some(start) = filter.price_start {
        query.push(" AND price_cents >= ").push_bind(start.cents());
    }

    if let Some(end) = filter.price_end {
        query.push(" AND price_cents <= ").push_bind(end.cents());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shop_core::Money;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = [
            ("Pork ribs", "pork", 1250, true),
            ("Pork chops", "pork", 900, false),
            ("Beef brisket", "beef", 2400, true),
            ("Oak chair", "furniture", 4500, true),
        ];
        for (name, category, cents, in_stock) in products {
            let product = NewProduct::new(name, Money::from_cents(cents))
                .unwrap()
                .with_category(category)
                .with_in_stock(in_stock);
            db.products().insert(&product).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let new = NewProduct::new("Lamb shoulder", Money::from_cents(1999))
            .unwrap()
            .with_description("Slow roast")
            .with_in_stock(false);

        let inserted = db.products().insert(&new).await.unwrap();
        let fetched = db.products().get_by_id(inserted.id).await.unwrap().unwrap();

        assert_eq!(fetched, inserted);
        assert_eq!(fetched.price_cents, 1999);
        assert!(!fetched.in_stock);
        assert_eq!(fetched.description.as_deref(), Some("Slow roast"));
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.products().get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_missing() {
        let db = seeded().await;

        let ids = BTreeSet::from([1, 3, 999]);
        let found = db.products().find_by_ids(&ids).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[&1].name, "Pork ribs");
        assert_eq!(found[&3].name, "Beef brisket");
        assert!(!found.contains_key(&999));
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_set() {
        let db = seeded().await;
        let found = db.products().find_by_ids(&BTreeSet::new()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name_and_category() {
        let db = seeded().await;

        let filter = ProductFilter {
            name: Some("pork".to_string()),
            ..Default::default()
        };
        let page = db.products().search(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.meta.total, 2);

        let filter = ProductFilter {
            category: Some("furn".to_string()),
            ..Default::default()
        };
        let page = db.products().search(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "Oak chair");
    }

    #[tokio::test]
    async fn test_search_by_price_range_is_inclusive() {
        let db = seeded().await;

        let filter = ProductFilter {
            price_start: Some(Money::from_cents(1250)),
            price_end: Some(Money::from_cents(2400)),
            ..Default::default()
        };
        let page = db.products().search(&filter, PageRequest::default()).await.unwrap();

        let names: Vec<_> = page.data.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pork ribs", "Beef brisket"]);
    }

    #[tokio::test]
    async fn test_search_pagination() {
        let db = seeded().await;

        let page_request = PageRequest::new(Some(2), Some(3)).unwrap();
        let page = db
            .products()
            .search(&ProductFilter::default(), page_request)
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 4);
        assert_eq!(page.meta.last_page, 2);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.data[0].name, "Oak chair");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = seeded().await;

        let filter = ProductFilter {
            name: Some("%".to_string()),
            ..Default::default()
        };
        let page = db.products().search(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.meta.total, 0);
    }

    #[tokio::test]
    async fn test_count() {
        let db = seeded().await;
        assert_eq!(db.products().count().await.unwrap(), 4);
    }
}

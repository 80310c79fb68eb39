//! # Repository Module
//!
//! Database repository implementations for the shop backend.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / service                                                │
//! │       │                                                                 │
//! │       │  db.orders().run_in_transaction(|tx| ...)                      │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── run_in_transaction(f)         ← begin / commit / rollback         │
//! │  ├── insert_order(conn, order)     ← inside the transaction            │
//! │  ├── insert_order_item(conn, ..)   ← inside the transaction            │
//! │  └── get_by_id / list / items      ← pool reads                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods on `&self` use the repository's pool. Associated functions that
//! take `conn: &mut SqliteConnection` run on whatever connection the caller
//! hands in, typically `&mut **tx` of an open transaction.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog lookups and search
//! - [`order::OrderRepository`] - Transactional order writes, order reads
//! - [`user::UserRepository`] - Registered users and credentials
//! - [`token::AccessTokenRepository`] - Issued bearer tokens

pub mod order;
pub mod product;
pub mod token;
pub mod user;

/// Escapes `%`, `_` and `\` so user input matches literally inside a
/// `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

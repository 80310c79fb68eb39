//! # Access Token Repository
//!
//! Every bearer token handed to a client has a row here, keyed by the
//! token's `jti`. A signature-valid token whose row is gone has been
//! revoked.
//!
//! ```text
//! register / login ──► insert(jti)
//! each request     ──► find_active(jti, now)
//! logout           ──► delete(jti)
//! login            ──► delete_for_user(user_id)   (before the new insert)
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shop_core::UserId;

/// An issued access token.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AccessToken {
    /// The JWT `jti` claim.
    pub id: String,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Repository for access token rows.
#[derive(Debug, Clone)]
pub struct AccessTokenRepository {
    pool: SqlitePool,
}

impl AccessTokenRepository {
    /// Creates a new AccessTokenRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccessTokenRepository { pool }
    }

    /// Records an issued token.
    pub async fn insert(&self, token: &AccessToken) -> DbResult<()> {
        debug!(user_id = token.user_id, name = %token.name, "Recording access token");

        sqlx::query(
            r#"
            INSERT INTO access_tokens (id, user_id, name, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&token.id)
        .bind(token.user_id)
        .bind(&token.name)
        .bind(token.created_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Finds a token that has not been revoked and has not expired.
    pub async fn find_active(&self, id: &str, now: DateTime<Utc>) -> DbResult<Option<AccessToken>> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            SELECT id, user_id, name, created_at, expires_at
            FROM access_tokens
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token.filter(|t| t.expires_at > now))
    }

    /// Revokes one token. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        debug!("Revoking access token");

        let result = sqlx::query("DELETE FROM access_tokens WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token of a user. Returns how many were removed.
    pub async fn delete_for_user(&self, user_id: UserId) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id, revoked = result.rows_affected(), "Revoked user tokens");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, NewUser};
    use chrono::Duration;

    async fn setup() -> (Database, UserId) {
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
        (db, user.id)
    }

    fn token(id: &str, user_id: UserId, lifetime: Duration) -> AccessToken {
        let now = Utc::now();
        AccessToken {
            id: id.to_string(),
            user_id,
            name: "auth_token".to_string(),
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    #[tokio::test]
    async fn test_active_token_lifecycle() {
        let (db, user_id) = setup().await;
        db.tokens().insert(&token("t1", user_id, Duration::hours(1))).await.unwrap();

        let found = db.tokens().find_active("t1", Utc::now()).await.unwrap();
        assert_eq!(found.map(|t| t.user_id), Some(user_id));

        assert!(db.tokens().delete("t1").await.unwrap());
        assert!(db.tokens().find_active("t1", Utc::now()).await.unwrap().is_none());
        assert!(!db.tokens().delete("t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_is_inactive() {
        let (db, user_id) = setup().await;
        db.tokens().insert(&token("old", user_id, Duration::seconds(-1))).await.unwrap();

        assert!(db.tokens().find_active("old", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_for_user() {
        let (db, user_id) = setup().await;
        db.tokens().insert(&token("a", user_id, Duration::hours(1))).await.unwrap();
        db.tokens().insert(&token("b", user_id, Duration::hours(1))).await.unwrap();

        assert_eq!(db.tokens().delete_for_user(user_id).await.unwrap(), 2);
        assert!(db.tokens().find_active("a", Utc::now()).await.unwrap().is_none());
    }
}

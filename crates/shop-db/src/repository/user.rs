//! # User Repository
//!
//! Registered users. Password hashes are written and read here but never
//! leave this module inside a [`User`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shop_core::{User, UserId};

/// A user about to be registered. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// A user row together with its stored password hash, for login.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user.
    ///
    /// ## Returns
    /// * `Ok(User)` - Inserted user with generated id
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        debug!(email = %user.email, "Inserting user");

        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", user.email.clone()),
            other => other,
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            created_at,
        })
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: UserId) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, phone, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user and their password hash by email.
    pub async fn find_credentials(&self, email: &str) -> DbResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id, name, email, phone, created_at, password_hash
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Checks whether a user with this id exists.
    pub async fn exists(&self, id: UserId) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Checks whether an email is already registered.
    pub async fn email_taken(&self, email: &str) -> DbResult<bool> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn jane() -> NewUser {
        NewUser {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("+380501234567".to_string()),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db.users().insert(&jane()).await.unwrap();
        let fetched = db.users().get_by_id(user.id).await.unwrap().unwrap();

        assert_eq!(fetched, user);
        assert!(db.users().exists(user.id).await.unwrap());
        assert!(!db.users().exists(user.id + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().insert(&jane()).await.unwrap();

        let err = db.users().insert(&jane()).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "email");
                assert_eq!(value, "jane@example.com");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert!(db.users().email_taken("jane@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_credentials() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().insert(&jane()).await.unwrap();

        let credentials = db
            .users()
            .find_credentials("jane@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(credentials.user.id, user.id);
        assert_eq!(credentials.password_hash, "$argon2id$stub");
        assert!(db.users().find_credentials("nobody@example.com").await.unwrap().is_none());
    }
}

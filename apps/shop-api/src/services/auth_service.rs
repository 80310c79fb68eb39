//! Authentication service.
//!
//! Handles registration, login and logout, and records every issued token
//! so it can be revoked.

use std::sync::Arc;

use shop_core::validation::{validate_email, validate_password, validate_phone, validate_user_name};
use shop_core::{User, UserId, ValidationError};
use shop_db::{AccessToken, NewUser};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::AppState;

/// Name recorded on every issued token.
const TOKEN_NAME: &str = "auth_token";

/// Registration input as received from the client.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: Option<String>,
}

/// Authentication service implementation.
pub struct AuthService {
    state: Arc<AppState>,
}

impl AuthService {
    /// Create a new authentication service.
    pub fn new(state: Arc<AppState>) -> Self {
        AuthService { state }
    }

    /// Registers a user and returns a bearer token for them.
    ///
    /// Every field is checked and all failures are reported together.
    pub async fn register(&self, input: Registration) -> Result<String, ApiError> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let phone = input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let mut errors: Vec<ValidationError> = Vec::new();
        errors.extend(validate_user_name(&name).err());
        errors.extend(validate_email(&email).err());
        errors.extend(validate_password(&input.password, &input.password_confirmation).err());
        if let Some(phone) = &phone {
            errors.extend(validate_phone(phone).err());
        }

        if !errors.iter().any(|e| e.field() == "email")
            && self.state.db.users().email_taken(&email).await?
        {
            errors.push(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email.clone(),
            });
        }

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let user = self
            .state
            .db
            .users()
            .insert(&NewUser {
                name,
                email,
                phone,
                password_hash: hash_password(&input.password)?,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        self.issue_token(user.id).await
    }

    /// Verifies credentials, revokes the user's previous tokens, and
    /// returns a new one.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let email = email.trim().to_lowercase();

        let mut errors: Vec<ValidationError> = Vec::new();
        errors.extend(validate_email(&email).err());
        if password.is_empty() {
            errors.push(ValidationError::Required {
                field: "password".to_string(),
            });
        }
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let credentials = self.state.db.users().find_credentials(&email).await?;

        let user = match credentials {
            Some(c) if verify_password(password, &c.password_hash) => c.user,
            _ => {
                warn!("Login failed: invalid credentials");
                return Err(ApiError::field(
                    "email",
                    "The provided credentials are incorrect.",
                ));
            }
        };

        let revoked = self.state.db.tokens().delete_for_user(user.id).await?;
        info!(user_id = user.id, revoked, "User logged in");

        self.issue_token(user.id).await
    }

    /// Revokes the token used for the current request.
    pub async fn logout(&self, user: &User, token_id: &str) -> Result<(), ApiError> {
        self.state.db.tokens().delete(token_id).await?;
        info!(user_id = user.id, "User logged out");
        Ok(())
    }

    /// Signs a token for `user_id` and records its `jti`.
    async fn issue_token(&self, user_id: UserId) -> Result<String, ApiError> {
        let issued = self.state.jwt.issue(user_id)?;

        self.state
            .db
            .tokens()
            .insert(&AccessToken {
                id: issued.claims.jti.clone(),
                user_id,
                name: TOKEN_NAME.to_string(),
                created_at: issued.claims.issued_at(),
                expires_at: issued.claims.expires_at(),
            })
            .await?;

        Ok(issued.token)
    }
}

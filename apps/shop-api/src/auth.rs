//! JWT authentication module.
//!
//! Handles token issuance and validation, password hashing, and the
//! [`AuthUser`] extractor that guards protected routes.
//!
//! ## Request Authentication
//! ```text
//! Authorization: Bearer <jwt>
//!      │
//!      ▼
//! signature + exp valid? ──no──► 401
//!      │
//!      ▼
//! access_tokens row for jti? ──no──► 401   (logged out / revoked)
//!      │
//!      ▼
//! AuthUser { user, token_id }
//! ```

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use shop_core::{User, UserId};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID, also the key of the token's `access_tokens` row
    pub jti: String,
}

impl Claims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0).single().unwrap_or_else(Utc::now)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate an access token for a user.
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// `jti` of the token used for this request
    pub token_id: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(ApiError::unauthenticated)?;

        let claims = state.jwt.validate_token(token)?;

        let record = state
            .db
            .tokens()
            .find_active(&claims.jti, Utc::now())
            .await?
            .ok_or_else(ApiError::unauthenticated)?;

        let user = state
            .db
            .users()
            .get_by_id(record.user_id)
            .await?
            .ok_or_else(ApiError::unauthenticated)?;

        Ok(AuthUser {
            user,
            token_id: record.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let issued = manager.issue(42).unwrap();
        let claims = manager.validate_token(&issued.token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.jti, issued.claims.jti);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_each_token_has_its_own_jti() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let first = manager.issue(1).unwrap();
        let second = manager.issue(1).unwrap();

        assert_ne!(first.claims.jti, second.claims.jti);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a".to_string(), 3600);
        let verifier = JwtManager::new("secret-b".to_string(), 3600);

        let issued = issuer.issue(1).unwrap();
        assert!(verifier.validate_token(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60 second leeway
        let manager = JwtManager::new("test-secret".to_string(), -120);

        let issued = manager.issue(1).unwrap();
        assert!(manager.validate_token(&issued.token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("secret123", "not-a-hash"));
    }
}

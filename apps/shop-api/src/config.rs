//! Shop API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Shop API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface the HTTP server binds to
    pub bind_addr: String,

    /// HTTP server port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Upper bound of the connection pool
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds
    pub jwt_lifetime_secs: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8000,
            database_path: "./shop.db".to_string(),
            db_max_connections: 5,
            // In production, this MUST be set via environment variable
            jwt_secret: "shop-api-dev-secret-change-in-production".to_string(),
            jwt_lifetime_secs: 86_400, // 1 day
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            bind_addr: env::var("HTTP_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("HTTP_PORT", defaults.port)?,
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_lifetime_secs: parse_var("JWT_LIFETIME_SECS", defaults.jwt_lifetime_secs)?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 86_400);
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let port: u16 = parse_var("SHOP_API_TEST_UNSET_PORT", 8000).unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("SHOP_API_TEST_BAD_PORT", "eighty");
        let result: Result<u16, _> = parse_var("SHOP_API_TEST_BAD_PORT", 8000);
        env::remove_var("SHOP_API_TEST_BAD_PORT");

        assert!(matches!(result, Err(ConfigError::InvalidValue(name)) if name == "SHOP_API_TEST_BAD_PORT"));
    }
}

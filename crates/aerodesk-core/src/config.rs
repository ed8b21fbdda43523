use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::jwt::token_lifetime;
use crate::error::AerodeskError;

/// Security-related settings for the auth controller.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Minimum password length accepted at registration (default: 8)
    pub min_password_length: usize,

    /// Role granted to newly registered users, if that role has been seeded
    /// (default: "user"). Empty disables default assignment.
    pub default_role: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 8,
            default_role: Some("user".to_string()),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://aerodesk.db, postgres://...)
    pub database_url: String,

    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiry in hours (default: 24)
    pub jwt_expiry_hours: u64,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Prefix the auth route table is mounted under (default: /api)
    pub api_prefix: String,

    /// How long resolved role permissions stay cached, in seconds (default: 300)
    pub rbac_cache_ttl_secs: u64,

    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, AerodeskError> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an explicit key/value map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, AerodeskError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AerodeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if environment == "production" => {
                return Err(AerodeskError::Internal(
                    "JWT_SECRET must be set in production".to_string(),
                ));
            }
            _ => "aerodesk-dev-secret-change-me".to_string(),
        };

        let default_role = match lookup("DEFAULT_ROLE") {
            Some(role) if role.is_empty() => None,
            Some(role) => Some(role),
            None => Some("user".to_string()),
        };

        let mut api_prefix = lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string());
        while api_prefix.ends_with('/') {
            api_prefix.pop();
        }
        if !api_prefix.is_empty() && !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }

        let jwt_expiry_hours = parse_or(&lookup, "JWT_EXPIRY_HOURS", 24)?;
        token_lifetime(jwt_expiry_hours).map_err(|e| {
            AerodeskError::Internal(format!("JWT_EXPIRY_HOURS has an invalid value: {e}"))
        })?;

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://aerodesk.db?mode=rwc".to_string()),
            jwt_secret,
            jwt_expiry_hours,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", 3000)?,
            environment,
            api_prefix,
            rbac_cache_ttl_secs: parse_or(&lookup, "RBAC_CACHE_TTL_SECS", 300)?,
            security: SecurityConfig {
                min_password_length: parse_or(&lookup, "MIN_PASSWORD_LENGTH", 8)?,
                default_role,
            },
        })
    }

    /// Configuration used by the test harness: in-memory SQLite, random port.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret-key-for-testing".to_string(),
            jwt_expiry_hours: 24,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            environment: "test".to_string(),
            api_prefix: "/api".to_string(),
            rbac_cache_ttl_secs: 300,
            security: SecurityConfig::default(),
        }
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn rbac_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.rbac_cache_ttl_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AerodeskError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AerodeskError::Internal(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_map(&HashMap::new()).unwrap();
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.security.default_role.as_deref(), Some("user"));
        assert_eq!(config.rbac_cache_ttl(), Duration::from_secs(300));
        assert!(config.is_dev());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_map(&vars(&[
            ("SERVER_PORT", "8080"),
            ("API_PREFIX", "/v1/"),
            ("DEFAULT_ROLE", ""),
            ("MIN_PASSWORD_LENGTH", "12"),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.api_prefix, "/v1");
        assert!(config.security.default_role.is_none());
        assert_eq!(config.security.min_password_length, 12);
    }

    #[test]
    fn test_prefix_is_normalized() {
        let config = Config::from_map(&vars(&[("API_PREFIX", "backoffice//")])).unwrap();
        assert_eq!(config.api_prefix, "/backoffice");

        let root = Config::from_map(&vars(&[("API_PREFIX", "/")])).unwrap();
        assert_eq!(root.api_prefix, "");
    }

    #[test]
    fn test_jwt_expiry_out_of_range_is_rejected() {
        for raw in ["0", "3000000000000000", "18446744073709551615"] {
            let err = Config::from_map(&vars(&[("JWT_EXPIRY_HOURS", raw)])).unwrap_err();
            assert!(err.to_string().contains("JWT_EXPIRY_HOURS"), "{raw}: {err}");
        }
        let config = Config::from_map(&vars(&[("JWT_EXPIRY_HOURS", "720")])).unwrap();
        assert_eq!(config.jwt_expiry_hours, 720);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_map(&vars(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn test_production_requires_secret() {
        assert!(Config::from_map(&vars(&[("ENVIRONMENT", "production")])).is_err());
        assert!(
            Config::from_map(&vars(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "s3cr3t")]))
                .is_ok()
        );
    }
}

//! Configuration management for the Chirpy backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: CHIRPY__)
//! 4. Flat variables `DB_URL`, `PLATFORM`, `SECRET`, `POLKA_KEY`,
//!    `MAX_CHIRP_LENGTH` and `PORT`

use crate::auth::{AuthError, AuthResult};
use anyhow::Result;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::env;

/// Application configuration
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub password: PasswordConfig,
    pub chirps: ChirpConfig,
    /// `dev` enables the admin reset endpoint
    pub platform: String,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/app`
    pub static_dir: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: ".".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Database configuration. An empty URL selects the in-memory stores.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
        }
    }
}

/// Token and API key configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub jwt_secret: SecretString,
    /// Static key expected from the Polka webhook
    pub polka_key: SecretString,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            polka_key: SecretString::new(String::new()),
            access_token_ttl_secs: 3600,  // 1 hour
            refresh_token_ttl_days: 60,
        }
    }
}

impl AuthConfig {
    /// Session token lifetime; rejects values chrono cannot represent
    pub fn access_token_ttl(&self) -> AuthResult<Duration> {
        token_lifetime(
            Duration::try_seconds(self.access_token_ttl_secs),
            "access_token_ttl_secs",
        )
    }

    /// Refresh token lifetime; rejects values chrono cannot represent
    pub fn refresh_token_ttl(&self) -> AuthResult<Duration> {
        token_lifetime(
            Duration::try_days(self.refresh_token_ttl_days),
            "refresh_token_ttl_days",
        )
    }
}

/// A lifetime must be positive and must not push an expiry past the end of time
fn token_lifetime(ttl: Option<Duration>, name: &str) -> AuthResult<Duration> {
    ttl.filter(|ttl| *ttl > Duration::zero() && Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| AuthError::Config(format!("{} is out of range", name)))
}

/// Algorithm used for new password hashes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Argon2,
    Bcrypt,
}

/// Password hashing cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub algorithm: HashAlgorithm,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Argon2,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
            bcrypt_cost: 12,
        }
    }
}

/// Chirp limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChirpConfig {
    /// Maximum body length in characters
    pub max_length: usize,
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self { max_length: 140 }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with CHIRPY__ prefix
    /// 4. Flat variables kept for existing deployments
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g., CHIRPY__SERVER__PORT=9000 sets server.port
            .add_source(config::Environment::with_prefix("CHIRPY").separator("__"))
            .set_override_option("database.url", env::var("DB_URL").ok())?
            .set_override_option("platform", env::var("PLATFORM").ok())?
            .set_override_option("auth.jwt_secret", env::var("SECRET").ok())?
            .set_override_option("auth.polka_key", env::var("POLKA_KEY").ok())?
            .set_override_option("chirps.max_length", env::var("MAX_CHIRP_LENGTH").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self) -> AuthResult<()> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            return Err(AuthError::Config("SECRET must be set".to_string()));
        }
        if self.auth.polka_key.expose_secret().is_empty() {
            return Err(AuthError::Config("POLKA_KEY must be set".to_string()));
        }
        self.auth.access_token_ttl()?;
        self.auth.refresh_token_ttl()?;
        if self.chirps.max_length == 0 {
            return Err(AuthError::Config("MAX_CHIRP_LENGTH must be positive".to_string()));
        }
        Ok(())
    }

    /// Whether the admin reset endpoint is enabled
    pub fn is_dev_platform(&self) -> bool {
        self.platform == "dev"
    }

    /// Whether a database URL is configured
    pub fn uses_database(&self) -> bool {
        !self.database.url.is_empty()
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }

    /// Development configuration with fixed secrets and cheap hashing,
    /// for in-memory servers in tests
    pub fn for_tests() -> Self {
        Self {
            auth: AuthConfig {
                jwt_secret: SecretString::new("test-jwt-secret".to_string()),
                polka_key: SecretString::new("f271c81ff7084ee5b99a5091b42d486e".to_string()),
                ..Default::default()
            },
            password: PasswordConfig {
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                ..Default::default()
            },
            platform: "dev".to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.auth.access_token_ttl().unwrap(), Duration::hours(1));
        assert_eq!(config.auth.refresh_token_ttl().unwrap(), Duration::days(60));
        assert_eq!(config.chirps.max_length, 140);
        assert_eq!(config.password.algorithm, HashAlgorithm::Argon2);
        assert!(!config.uses_database());
        assert!(!config.is_dev_platform());
    }

    #[test]
    fn test_default_config_is_rejected() {
        // No secrets configured
        let result = AppConfig::default().validate();
        assert!(matches!(result, Err(AuthError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::for_tests();
        assert!(config.validate().is_ok());
        assert!(config.is_dev_platform());

        let mut config = AppConfig::for_tests();
        config.auth.polka_key = SecretString::new(String::new());
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_tests();
        config.auth.access_token_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::for_tests();
        config.chirps.max_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_token_lifetimes_are_config_errors() {
        let mut config = AppConfig::for_tests();
        config.auth.refresh_token_ttl_days = i64::MAX;
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
        assert!(config.auth.refresh_token_ttl().is_err());

        let mut config = AppConfig::for_tests();
        config.auth.access_token_ttl_secs = i64::MAX;
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));

        // Representable as a duration, but the expiry would overflow a timestamp
        let mut config = AppConfig::for_tests();
        config.auth.refresh_token_ttl_days = 100_000_000;
        assert!(matches!(config.validate(), Err(AuthError::Config(_))));

        let mut config = AppConfig::for_tests();
        config.auth.refresh_token_ttl_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_toml_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                platform = "dev"

                [auth]
                jwt_secret = "s3cret"

                [password]
                algorithm = "bcrypt"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.platform, "dev");
        assert_eq!(config.auth.jwt_secret.expose_secret(), "s3cret");
        assert_eq!(config.auth.access_token_ttl_secs, 3600);
        assert_eq!(config.password.algorithm, HashAlgorithm::Bcrypt);
        assert_eq!(config.password.bcrypt_cost, 12);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::for_tests();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("test-jwt-secret"));
    }

    #[test]
    fn test_is_production() {
        // Default should be false (development)
        assert!(!AppConfig::is_production());
    }
}

//! PostgreSQL pool and migrations
//!
//! Only used when `database.url` is set; otherwise the service runs on the
//! in-memory stores.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const APPLICATION_NAME: &str = "chirpy";

/// Pool options derived from the database section of the config
fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
}

/// Connect to the users/chirps/refresh_tokens database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.url)
        .context("invalid database url")?
        .application_name(APPLICATION_NAME);

    let pool = pool_options(config).connect_with(options).await?;

    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Round-trip a trivial query; backs the readiness probe
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_connections_never_exceed_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..Default::default()
        };
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 2);
        assert_eq!(options.get_min_connections(), 2);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(connect(&config).await.is_err());
    }
}

//! Refresh token repository for database operations

use crate::auth::Identity;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::fmt;

/// Refresh token record from database
#[derive(Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Identity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Neither revoked nor expired at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired_at(now)
    }
}

// The token value is a bearer credential; keep it out of logs.
impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

/// Persistence for refresh tokens.
///
/// Implementations must enforce uniqueness of `token` and make
/// [`revoke`](RefreshTokenRepository::revoke) a single atomic
/// "set revoked_at if not already set" update.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new token; fails if the token value already exists
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()>;

    /// Find a token by value, whatever its state
    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Set `revoked_at = at` unless already set. Returns the stored record,
    /// or `None` if no such token exists.
    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<Option<RefreshTokenRecord>>;

    /// Remove every token
    async fn delete_all(&self) -> Result<u64>;
}

/// PostgreSQL-backed refresh token repository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            UPDATE refresh_tokens SET
                revoked_at = COALESCE(revoked_at, $2),
                updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END
            WHERE token = $1
            RETURNING token, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(token)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_in: Duration, revoked: bool) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token: "a".repeat(64),
            user_id: Identity::new(),
            created_at: now,
            updated_at: now,
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
        }
    }

    #[test]
    fn test_active_record() {
        assert!(record(Duration::days(60), false).is_active_at(Utc::now()));
    }

    #[test]
    fn test_revoked_record_is_inactive() {
        assert!(!record(Duration::days(60), true).is_active_at(Utc::now()));
    }

    #[test]
    fn test_expired_record_is_inactive() {
        let rec = record(Duration::days(60), false);
        assert!(!rec.is_active_at(rec.expires_at + Duration::seconds(1)));
        // Exactly at expiry is still valid
        assert!(rec.is_active_at(rec.expires_at));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rec = record(Duration::days(1), false);
        let debug_str = format!("{:?}", rec);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(&rec.token));
    }
}

//! User repository for database operations

use crate::auth::Identity;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chirpy_shared::types::UserResponse;
use sqlx::PgPool;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Identity,
    pub email: String,
    pub hashed_password: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public view of the user, without the credential hash
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id.as_uuid(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            email: self.email.clone(),
            is_chirpy_red: self.is_chirpy_red,
        }
    }
}

/// Another account already holds the email
#[derive(Debug, thiserror::Error)]
#[error("email already registered")]
pub struct DuplicateEmail;

/// Turn a unique-constraint violation on `users.email` into [`DuplicateEmail`]
fn duplicate_email(err: sqlx::Error) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DuplicateEmail.into(),
        _ => err.into(),
    }
}

/// User store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; fails with [`DuplicateEmail`] if the email is taken
    async fn create(&self, email: &str, hashed_password: &str) -> Result<UserRecord>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_by_id(&self, id: Identity) -> Result<Option<UserRecord>>;

    /// Replace email and password hash. `None` if the user does not exist,
    /// [`DuplicateEmail`] if another user holds the email.
    async fn update_credentials(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>>;

    /// Mark the user as a Chirpy Red subscriber. `None` if the user does not exist.
    async fn upgrade_to_red(&self, id: Identity) -> Result<Option<UserRecord>>;

    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Delete every user (chirps and refresh tokens cascade)
    async fn delete_all(&self) -> Result<u64>;

    /// Check the backing store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(Identity::new())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email)?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Identity) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                email = $2,
                hashed_password = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(hashed_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(duplicate_email)?;

        Ok(user)
    }

    async fn upgrade_to_red(&self, id: Identity) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                is_chirpy_red = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, hashed_password, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<()> {
        crate::db::ping(&self.pool).await
    }
}

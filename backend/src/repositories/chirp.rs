//! Chirp repository for database operations

use crate::auth::{Identity, OwnedResource};
use anyhow::Result;
use async_trait::async_trait;
use chirpy_shared::types::{ChirpResponse, SortOrder};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Chirp record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ChirpRecord {
    pub id: Uuid,
    pub body: String,
    pub user_id: Identity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChirpRecord {
    pub fn to_response(&self) -> ChirpResponse {
        ChirpResponse {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            body: self.body.clone(),
            user_id: self.user_id.as_uuid(),
        }
    }
}

impl OwnedResource for ChirpRecord {
    fn owner(&self) -> Identity {
        self.user_id
    }
}

/// Chirp store
#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, author: Identity, body: &str) -> Result<ChirpRecord>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChirpRecord>>;

    /// All chirps ordered by creation time
    async fn list_all(&self, order: SortOrder) -> Result<Vec<ChirpRecord>>;

    /// One author's chirps ordered by creation time
    async fn list_by_author(&self, author: Identity, order: SortOrder) -> Result<Vec<ChirpRecord>>;

    /// Delete a chirp; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn delete_all(&self) -> Result<u64>;
}

/// PostgreSQL-backed chirp repository
#[derive(Clone)]
pub struct PgChirpRepository {
    pool: PgPool,
}

impl PgChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_sql(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

#[async_trait]
impl ChirpRepository for PgChirpRepository {
    async fn create(&self, author: Identity, body: &str) -> Result<ChirpRecord> {
        let chirp = sqlx::query_as::<_, ChirpRecord>(
            r#"
            INSERT INTO chirps (id, body, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, body, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(body)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChirpRecord>> {
        let chirp = sqlx::query_as::<_, ChirpRecord>(
            r#"
            SELECT id, body, user_id, created_at, updated_at
            FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn list_all(&self, order: SortOrder) -> Result<Vec<ChirpRecord>> {
        let sql = format!(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps ORDER BY created_at {}",
            order_sql(order)
        );
        let chirps = sqlx::query_as::<_, ChirpRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(chirps)
    }

    async fn list_by_author(&self, author: Identity, order: SortOrder) -> Result<Vec<ChirpRecord>> {
        let sql = format!(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps WHERE user_id = $1 ORDER BY created_at {}",
            order_sql(order)
        );
        let chirps = sqlx::query_as::<_, ChirpRecord>(&sql)
            .bind(author)
            .fetch_all(&self.pool)
            .await?;

        Ok(chirps)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chirps").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_sql() {
        assert_eq!(order_sql(SortOrder::Asc), "ASC");
        assert_eq!(order_sql(SortOrder::Desc), "DESC");
    }

    #[test]
    fn test_chirp_owner_is_author() {
        let author = Identity::new();
        let now = Utc::now();
        let chirp = ChirpRecord {
            id: Uuid::new_v4(),
            body: "hello".to_string(),
            user_id: author,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(chirp.owner(), author);
        assert_eq!(chirp.to_response().user_id, author.as_uuid());
    }
}

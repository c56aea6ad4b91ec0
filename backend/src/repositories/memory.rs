//! In-memory repositories
//!
//! Used when no database URL is configured and by the router tests. Each
//! store is a `tokio::sync::RwLock` around plain collections; every
//! operation takes the lock once, so check-then-write sequences are atomic.

use super::chirp::{ChirpRecord, ChirpRepository};
use super::refresh_token::{RefreshTokenRecord, RefreshTokenRepository};
use super::user::{DuplicateEmail, UserRecord, UserRepository};
use crate::auth::Identity;
use anyhow::{bail, Result};
use async_trait::async_trait;
use chirpy_shared::types::SortOrder;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory user store
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Identity, UserRecord>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, email: &str, hashed_password: &str) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(DuplicateEmail.into());
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Identity::new(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Identity) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn update_credentials(
        &self,
        id: Identity,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(DuplicateEmail.into());
        }

        Ok(users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_to_red(&self, id: Identity) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.is_chirpy_red = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut users = self.users.write().await;
        let count = users.len() as u64;
        users.clear();
        Ok(count)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// In-memory chirp store, kept in insertion order
#[derive(Default)]
pub struct MemoryChirpRepository {
    chirps: RwLock<Vec<ChirpRecord>>,
}

impl MemoryChirpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut chirps: Vec<ChirpRecord>, order: SortOrder) -> Vec<ChirpRecord> {
    // Stable sort: equal timestamps keep insertion order
    match order {
        SortOrder::Asc => chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Desc => chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    chirps
}

#[async_trait]
impl ChirpRepository for MemoryChirpRepository {
    async fn create(&self, author: Identity, body: &str) -> Result<ChirpRecord> {
        let now = Utc::now();
        let chirp = ChirpRecord {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id: author,
            created_at: now,
            updated_at: now,
        };
        self.chirps.write().await.push(chirp.clone());
        Ok(chirp)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChirpRecord>> {
        let chirps = self.chirps.read().await;
        Ok(chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn list_all(&self, order: SortOrder) -> Result<Vec<ChirpRecord>> {
        Ok(sorted(self.chirps.read().await.clone(), order))
    }

    async fn list_by_author(&self, author: Identity, order: SortOrder) -> Result<Vec<ChirpRecord>> {
        let chirps = self.chirps.read().await;
        let own = chirps.iter().filter(|c| c.user_id == author).cloned().collect();
        Ok(sorted(own, order))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut chirps = self.chirps.write().await;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);
        Ok(chirps.len() != before)
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut chirps = self.chirps.write().await;
        let count = chirps.len() as u64;
        chirps.clear();
        Ok(count)
    }
}

/// In-memory refresh token store keyed by token value
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: RwLock<HashMap<String, RefreshTokenRecord>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, whatever their state
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&record.token) {
            bail!("refresh token already exists");
        }
        tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<Option<RefreshTokenRecord>> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens.get_mut(token).map(|record| {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
            record.clone()
        }))
    }

    async fn delete_all(&self) -> Result<u64> {
        let mut tokens = self.tokens.write().await;
        let count = tokens.len() as u64;
        tokens.clear();
        Ok(count)
    }
}

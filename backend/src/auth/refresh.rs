//! Refresh tokens
//!
//! Opaque 256-bit random values, hex-encoded, persisted with their owner,
//! expiry and revocation state. A token is valid while it exists, is not
//! revoked and has not expired. Revocation is permanent.

use super::error::{AuthError, AuthResult};
use super::identity::Identity;
use crate::repositories::{RefreshTokenRecord, RefreshTokenRepository};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use tracing::debug;

/// Number of random bytes in a refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a fresh refresh token value: 64 lowercase hex characters
pub fn generate_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Refresh token lifecycle over a pluggable store
#[derive(Clone)]
pub struct RefreshTokenService {
    store: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenService {
    pub fn new(store: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Configured refresh token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create and persist a new token for `identity`.
    ///
    /// Existing tokens of the same identity are left untouched.
    pub async fn issue(&self, identity: Identity) -> AuthResult<RefreshTokenRecord> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Config("Refresh token lifetime out of range".to_string()))?;
        let record = RefreshTokenRecord {
            token: generate_token(),
            user_id: identity,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };

        self.store.insert(&record).await?;
        debug!(user_id = %identity, "Refresh token issued");

        Ok(record)
    }

    /// Fetch a token record, whatever its state
    pub async fn lookup(&self, token: &str) -> AuthResult<RefreshTokenRecord> {
        self.store
            .find(token)
            .await?
            .ok_or_else(|| AuthError::NotFound("Refresh token not found".to_string()))
    }

    /// Revoke a token. Revoking twice keeps the first revocation time.
    pub async fn revoke(&self, token: &str) -> AuthResult<RefreshTokenRecord> {
        let record = self
            .store
            .revoke(token, Utc::now())
            .await?
            .ok_or_else(|| AuthError::NotFound("Refresh token not found".to_string()))?;

        debug!(user_id = %record.user_id, "Refresh token revoked");
        Ok(record)
    }

    /// Resolve the owner of a valid token.
    ///
    /// Unknown, revoked and expired tokens all fail the same way.
    pub async fn resolve_owner(&self, token: &str) -> AuthResult<Identity> {
        let record = self.store.find(token).await?;

        match record {
            Some(record) if record.is_active_at(Utc::now()) => Ok(record.user_id),
            _ => Err(AuthError::Unauthorized(
                "Invalid or expired refresh token".to_string(),
            )),
        }
    }

    /// Remove every token
    pub async fn clear(&self) -> AuthResult<u64> {
        Ok(self.store.delete_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryRefreshTokenStore;
    use proptest::prelude::*;

    fn service_with_store() -> (RefreshTokenService, Arc<MemoryRefreshTokenStore>) {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let service = RefreshTokenService::new(store.clone(), Duration::days(60));
        (service, store)
    }

    #[test]
    fn test_generated_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_rejected() {
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let ttl = Duration::try_days(100_000_000).unwrap();
        let service = RefreshTokenService::new(store.clone(), ttl);

        let result = service.issue(Identity::new()).await;
        assert!(matches!(result, Err(AuthError::Config(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let (service, _) = service_with_store();
        let identity = Identity::new();

        let record = service.issue(identity).await.unwrap();
        assert_eq!(record.user_id, identity);
        assert!(record.revoked_at.is_none());
        assert_eq!(record.expires_at - record.created_at, Duration::days(60));

        assert_eq!(service.resolve_owner(&record.token).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_revoked_token_no_longer_resolves() {
        let (service, _) = service_with_store();
        let record = service.issue(Identity::new()).await.unwrap();

        let revoked = service.revoke(&record.token).await.unwrap();
        assert!(revoked.is_revoked());
        assert!(matches!(
            service.resolve_owner(&record.token).await,
            Err(AuthError::Unauthorized(_))
        ));
        // Revocation is visible through lookup
        assert!(service.lookup(&record.token).await.unwrap().is_revoked());
    }

    #[tokio::test]
    async fn test_revoke_twice_keeps_first_time() {
        let (service, _) = service_with_store();
        let record = service.issue(Identity::new()).await.unwrap();

        let first = service.revoke(&record.token).await.unwrap();
        let second = service.revoke(&record.token).await.unwrap();
        assert_eq!(first.revoked_at, second.revoked_at);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (service, _) = service_with_store();
        assert!(matches!(service.lookup("nope").await, Err(AuthError::NotFound(_))));
        assert!(matches!(service.revoke("nope").await, Err(AuthError::NotFound(_))));
        assert!(matches!(
            service.resolve_owner("nope").await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_does_not_resolve() {
        let (service, store) = service_with_store();
        let created = Utc::now() - Duration::days(61);
        let record = RefreshTokenRecord {
            token: generate_token(),
            user_id: Identity::new(),
            created_at: created,
            updated_at: created,
            expires_at: created + Duration::days(60),
            revoked_at: None,
        };
        store.insert(&record).await.unwrap();

        assert!(matches!(
            service.resolve_owner(&record.token).await,
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_sessions_accumulate_per_identity() {
        let (service, store) = service_with_store();
        let identity = Identity::new();

        let first = service.issue(identity).await.unwrap();
        let second = service.issue(identity).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(store.len().await, 2);
        assert_eq!(service.resolve_owner(&first.token).await.unwrap(), identity);
        assert_eq!(service.resolve_owner(&second.token).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn test_clear_removes_all() {
        let (service, store) = service_with_store();
        service.issue(Identity::new()).await.unwrap();
        service.issue(Identity::new()).await.unwrap();

        assert_eq!(service.clear().await.unwrap(), 2);
        assert!(store.is_empty().await);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_tokens_are_distinct_hex(_seed in 0u8..=255) {
            let a = generate_token();
            let b = generate_token();
            prop_assert_eq!(a.len(), 64);
            prop_assert!(hex::decode(&a).is_ok());
            prop_assert_ne!(a, b);
        }
    }
}

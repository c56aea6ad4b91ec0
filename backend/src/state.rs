//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys, DB pools are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling,
//!    apart from the stores and the hit counter

use crate::auth::{AuthGuard, AuthResult, JwtService, PasswordService, RefreshTokenService};
use crate::config::AppConfig;
use crate::metrics::HitCounter;
use crate::repositories::{
    ChirpRepository, MemoryChirpRepository, MemoryRefreshTokenStore, MemoryUserRepository,
    PgChirpRepository, PgRefreshTokenRepository, PgUserRepository, RefreshTokenRepository,
    UserRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// This struct holds all shared resources that handlers need access to.
/// All fields are designed for cheap cloning across async tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub passwords: PasswordService,
    pub refresh_tokens: RefreshTokenService,
    pub guard: AuthGuard,
    pub users: Arc<dyn UserRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
    /// File-server hit counter
    pub hits: HitCounter,
    /// Set when a Prometheus recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by PostgreSQL
    ///
    /// # Note
    /// This pre-computes JWT keys from the config secret, and fails on a
    /// blank secret or invalid hashing parameters. Call once at startup.
    pub fn new(db: PgPool, config: AppConfig) -> AuthResult<Self> {
        Self::from_parts(
            config,
            Arc::new(PgUserRepository::new(db.clone())),
            Arc::new(PgChirpRepository::new(db.clone())),
            Arc::new(PgRefreshTokenRepository::new(db)),
        )
    }

    /// Create state backed by in-memory stores
    pub fn in_memory(config: AppConfig) -> AuthResult<Self> {
        Self::from_parts(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryChirpRepository::new()),
            Arc::new(MemoryRefreshTokenStore::new()),
        )
    }

    /// Create state over arbitrary stores
    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        chirps: Arc<dyn ChirpRepository>,
        refresh_store: Arc<dyn RefreshTokenRepository>,
    ) -> AuthResult<Self> {
        let jwt = JwtService::new(
            config.auth.jwt_secret.expose_secret(),
            config.auth.access_token_ttl()?,
        )?;
        let passwords = PasswordService::new(&config.password)?;
        let refresh_tokens =
            RefreshTokenService::new(refresh_store, config.auth.refresh_token_ttl()?);
        let guard = AuthGuard::new(
            jwt.clone(),
            SecretString::new(config.auth.polka_key.expose_secret().clone()),
        );

        Ok(Self {
            config: Arc::new(config),
            jwt,
            passwords,
            refresh_tokens,
            guard,
            users,
            chirps,
            hits: HitCounter::new(),
            prometheus: None,
        })
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    #[inline]
    pub fn refresh_tokens(&self) -> &RefreshTokenService {
        &self.refresh_tokens
    }

    #[inline]
    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    #[inline]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[inline]
    pub fn chirps(&self) -> &dyn ChirpRepository {
        self.chirps.as_ref()
    }

    #[inline]
    pub fn hits(&self) -> &HitCounter {
        &self.hits
    }
}

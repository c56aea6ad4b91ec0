//! Session token minting and verification
//!
//! Session tokens are HS256 JWTs carrying `{iss, sub, iat, exp}`. They are
//! stateless: nothing is persisted, and expiry is the only way they die.
//!
//! [`mint`] and [`verify`] are pure functions of their inputs and the clock.
//! [`JwtService`] wraps them with pre-computed keys for request handling.

use super::error::{AuthError, AuthResult};
use super::identity::Identity;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Issuer written into and required from every session token
pub const ISSUER: &str = "chirpy";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user identity as a string)
    #[serde(default)]
    pub sub: String,
    /// Issued at (NumericDate, fractional seconds)
    pub iat: f64,
    /// Expiration time (NumericDate, fractional seconds)
    pub exp: f64,
}

/// Seconds since the epoch with microsecond resolution
fn numeric_date(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// Mint a session token for `identity`, valid for `ttl`.
///
/// A blank secret is a configuration error, never a token.
pub fn mint(identity: Identity, secret: &str, ttl: Duration) -> AuthResult<String> {
    let keys = JwtKeys::new(secret)?;
    mint_with_key(identity, keys.encoding(), ttl, Utc::now())
}

/// Verify a session token and return the identity it was minted for
pub fn verify(token: &str, secret: &str) -> AuthResult<Identity> {
    let keys = JwtKeys::new(secret)?;
    verify_with_key(token, keys.decoding(), Utc::now())
}

fn mint_with_key(
    identity: Identity,
    key: &EncodingKey,
    ttl: Duration,
    now: DateTime<Utc>,
) -> AuthResult<String> {
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AuthError::Config("Session token lifetime out of range".to_string()))?;
    let claims = Claims {
        iss: ISSUER.to_string(),
        sub: identity.to_string(),
        iat: numeric_date(now),
        exp: numeric_date(expires_at),
    };

    encode(&Header::new(Algorithm::HS256), &claims, key)
        .map_err(|e| AuthError::Config(format!("Failed to sign token: {}", e)))
}

fn verify_with_key(token: &str, key: &DecodingKey, now: DateTime<Utc>) -> AuthResult<Identity> {
    // Expiry is checked by hand below: `exp <= now` with no leeway
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    // `exp` is required by `Claims` itself
    validation.set_required_spec_claims(&["iss"]);

    let claims = decode::<Claims>(token, key, &validation)
        .map_err(|e| AuthError::MalformedToken(e.to_string()))?
        .claims;

    if !claims.exp.is_finite() || claims.exp <= numeric_date(now) {
        return Err(AuthError::ExpiredToken);
    }

    if claims.sub.is_empty() {
        return Err(AuthError::InvalidSubject);
    }
    claims
        .sub
        .parse::<Identity>()
        .map_err(|_| AuthError::InvalidSubject)
}

/// Pre-computed JWT keys for efficient token operations
/// These are derived once and cached in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Derive keys from the signing secret, which must not be blank
    pub fn new(secret: &str) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Config("JWT signing secret must not be blank".to_string()));
        }
        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Uses pre-computed keys to avoid key derivation on every request.
/// Keys are wrapped in Arc for cheap cloning.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_token_ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &str, access_token_ttl: Duration) -> AuthResult<Self> {
        Ok(Self {
            keys: JwtKeys::new(secret)?,
            access_token_ttl,
        })
    }

    /// Mint a session token with the configured TTL
    #[inline]
    pub fn generate_access_token(&self, identity: Identity) -> AuthResult<String> {
        mint_with_key(identity, self.keys.encoding(), self.access_token_ttl, Utc::now())
    }

    /// Verify a session token and resolve its identity
    #[inline]
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Identity> {
        verify_with_key(token, self.keys.decoding(), Utc::now())
    }

    /// Session token lifetime
    #[inline]
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }
}

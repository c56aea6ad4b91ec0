//! Authentication and authorization errors
//!
//! These are the failure modes of the auth core. They are translated into
//! [`ApiError`](crate::error::ApiError) at the HTTP boundary, where the
//! individual token failures collapse into a single invalid-token response.

use thiserror::Error;

/// Auth core error type
#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization` header, or no credential after the scheme
    #[error("Missing credential")]
    MissingCredential,

    /// Token could not be parsed or its signature did not verify
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// Token expiry has passed
    #[error("Token expired")]
    ExpiredToken,

    /// Token subject is empty or not a valid identity
    #[error("Invalid token subject")]
    InvalidSubject,

    /// Refresh token absent/revoked/expired, API key mismatch or bad password
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated caller does not own the target resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Misconfiguration such as a blank signing secret
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    /// True for the failures that collapse into "invalid token" at the boundary
    pub fn is_invalid_token(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken(_) | AuthError::ExpiredToken | AuthError::InvalidSubject
        )
    }
}

/// Result alias for the auth core
pub type AuthResult<T> = Result<T, AuthError>;

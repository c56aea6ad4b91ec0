//! Credential extraction from the `Authorization` header
//!
//! Purely syntactic: the value is split on spaces and the second field is
//! returned. The scheme word is not checked (`bearer`, `Bearer` and
//! `ApiKey` all work) and nothing here validates the credential itself.

use super::error::{AuthError, AuthResult};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract the bearer token (session or refresh token) from the headers
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    credential(headers)
}

/// Extract the static API key sent by the webhook caller
pub fn api_key(headers: &HeaderMap) -> AuthResult<&str> {
    credential(headers)
}

fn credential(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    match value.split(' ').nth(1) {
        Some(field) if !field.is_empty() => Ok(field),
        _ => Err(AuthError::MissingCredential),
    }
}

//! Authorization guard
//!
//! Answers "who is this caller" and "may this caller act on this resource".
//! Per request: header extracted, identity resolved, then authorized or
//! forbidden. Loading the target resource is the caller's job.

use super::error::{AuthError, AuthResult};
use super::header;
use super::identity::Identity;
use super::jwt::JwtService;
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, warn};

/// A resource with a single owning identity
pub trait OwnedResource {
    fn owner(&self) -> Identity;
}

/// Composes header extraction, session verification and ownership checks
#[derive(Clone)]
pub struct AuthGuard {
    jwt: JwtService,
    webhook_key: Arc<SecretString>,
}

impl AuthGuard {
    pub fn new(jwt: JwtService, webhook_key: SecretString) -> Self {
        Self {
            jwt,
            webhook_key: Arc::new(webhook_key),
        }
    }

    /// Resolve the caller from a bearer session token
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let token = header::bearer_token(headers)?;
        self.jwt.validate_access_token(token).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            e
        })
    }

    /// Fail with `Forbidden` unless `caller` owns `resource`
    pub fn ensure_owner<R: OwnedResource>(&self, caller: &Identity, resource: &R) -> AuthResult<()> {
        let owner = resource.owner();
        if owner == *caller {
            Ok(())
        } else {
            warn!(user_id = %caller, owner_id = %owner, "Ownership check failed");
            Err(AuthError::Forbidden(
                "You can't modify a resource you don't own".to_string(),
            ))
        }
    }

    /// Check the webhook API key. No identity is resolved on this path.
    pub fn authorize_webhook(&self, headers: &HeaderMap) -> AuthResult<()> {
        let key = header::api_key(headers)?;
        if key == self.webhook_key.expose_secret().as_str() {
            Ok(())
        } else {
            warn!("Webhook API key mismatch");
            Err(AuthError::Unauthorized("Invalid API key".to_string()))
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use chrono::Duration;

    struct Note {
        author: Identity,
    }

    impl OwnedResource for Note {
        fn owner(&self) -> Identity {
            self.author
        }
    }

    fn guard() -> AuthGuard {
        let jwt = JwtService::new("guard-secret", Duration::hours(1)).unwrap();
        AuthGuard::new(jwt, SecretString::new("f271c81ff7084ee5b99a5091b42d486e".to_string()))
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_resolves_identity() {
        let guard = guard();
        let identity = Identity::new();
        let token = guard.jwt().generate_access_token(identity).unwrap();

        let resolved = guard.authenticate(&headers(&format!("Bearer {}", token))).unwrap();
        assert_eq!(resolved, identity);
    }

    #[test]
    fn test_authenticate_failures() {
        let guard = guard();
        assert!(matches!(
            guard.authenticate(&HeaderMap::new()),
            Err(AuthError::MissingCredential)
        ));

        let err = guard.authenticate(&headers("Bearer garbage")).unwrap_err();
        assert!(err.is_invalid_token());

        // Token from another deployment
        let foreign = crate::auth::jwt::mint(Identity::new(), "other", Duration::hours(1)).unwrap();
        let err = guard.authenticate(&headers(&format!("Bearer {}", foreign))).unwrap_err();
        assert!(err.is_invalid_token());
    }

    #[test]
    fn test_ensure_owner() {
        let guard = guard();
        let author = Identity::new();
        let note = Note { author };

        assert!(guard.ensure_owner(&author, &note).is_ok());
        assert!(matches!(
            guard.ensure_owner(&Identity::new(), &note),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn test_webhook_key() {
        let guard = guard();
        assert!(guard
            .authorize_webhook(&headers("ApiKey f271c81ff7084ee5b99a5091b42d486e"))
            .is_ok());
        assert!(matches!(
            guard.authorize_webhook(&headers("ApiKey wrong")),
            Err(AuthError::Unauthorized(_))
        ));
        assert!(matches!(
            guard.authorize_webhook(&HeaderMap::new()),
            Err(AuthError::MissingCredential)
        ));
        // Prefix of the key is not the key
        assert!(guard.authorize_webhook(&headers("ApiKey f271c81f")).is_err());
    }
}

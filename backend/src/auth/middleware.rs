//! Authentication extractor
//!
//! Resolves the caller from a bearer session token using the pre-computed
//! JWT keys held by the guard in AppState.

use super::identity::Identity;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::FromRef, http::request::Parts};

/// Authenticated user extracted from the session token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Identity,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user_id = app_state.guard().authenticate(&parts.headers)?;

        Ok(AuthUser { user_id })
    }
}

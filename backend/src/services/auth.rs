//! Session service: login, refresh and revoke
//!
//! # Performance Optimizations
//!
//! - Password verification runs on blocking thread pool
//! - Session tokens are minted with pre-computed keys

use crate::auth::{bearer_token, AuthError};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::http::HeaderMap;
use chirpy_shared::types::{LoginRequest, LoginResponse, RefreshResponse};
use tracing::info;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

/// Session service for authentication operations
pub struct AuthService;

impl AuthService {
    /// Login with email and password
    ///
    /// Unknown email and wrong password fail identically. On success a
    /// session token and a new refresh token are issued; earlier refresh
    /// tokens of the same user stay valid.
    pub async fn login(state: &AppState, req: LoginRequest) -> ApiResult<LoginResponse> {
        let Some(user) = state.users().find_by_email(&req.email).await? else {
            // Same hashing cost as a wrong password
            state.passwords().verify_decoy_async(req.password).await?;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        // Verify password on blocking thread pool (CPU-intensive)
        let valid = state
            .passwords()
            .verify_async(user.hashed_password.clone(), req.password)
            .await?;

        if !valid {
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = state.jwt().generate_access_token(user.id)?;
        let refresh = state.refresh_tokens().issue(user.id).await?;

        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: user.to_response(),
            token,
            refresh_token: refresh.token,
        })
    }

    /// Mint a new session token from the refresh token in the bearer header
    ///
    /// The refresh token is not rotated.
    pub async fn refresh(state: &AppState, headers: &HeaderMap) -> ApiResult<RefreshResponse> {
        let refresh_token = bearer_token(headers)?;
        let user_id = state.refresh_tokens().resolve_owner(refresh_token).await?;

        // Owner may have been deleted since the token was issued
        if state.users().find_by_id(user_id).await?.is_none() {
            return Err(ApiError::Unauthorized(
                "Invalid or expired refresh token".to_string(),
            ));
        }

        let token = state.jwt().generate_access_token(user_id)?;
        info!(user_id = %user_id, "Session token refreshed");

        Ok(RefreshResponse { token })
    }

    /// Revoke the refresh token in the bearer header
    ///
    /// Succeeds whether or not the token existed.
    pub async fn revoke(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
        let refresh_token = bearer_token(headers)?;

        match state.refresh_tokens().revoke(refresh_token).await {
            Ok(record) => {
                info!(user_id = %record.user_id, "Refresh token revoked");
                Ok(())
            }
            Err(AuthError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

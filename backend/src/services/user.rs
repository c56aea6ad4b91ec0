//! User service for registration and account management
//!
//! # Performance Optimizations
//!
//! - Password hashing runs on blocking thread pool

use crate::auth::Identity;
use crate::error::{ApiError, ApiResult};
use crate::repositories::DuplicateEmail;
use crate::state::AppState;
use axum::http::HeaderMap;
use chirpy_shared::types::{
    CreateUserRequest, UpdateUserRequest, UserResponse, WebhookRequest, USER_UPGRADED_EVENT,
};
use tracing::{debug, info};
use validator::Validate;

const EMAIL_TAKEN: &str = "Email already registered";

/// A lost race on the unique email constraint is a conflict, not a failure
fn conflict_on_duplicate(err: anyhow::Error) -> ApiError {
    if err.is::<DuplicateEmail>() {
        ApiError::Conflict(EMAIL_TAKEN.to_string())
    } else {
        ApiError::Internal(err)
    }
}

/// User service for account operations
pub struct UserService;

impl UserService {
    /// Register a new user
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    pub async fn register(state: &AppState, req: CreateUserRequest) -> ApiResult<UserResponse> {
        req.validate()?;

        // Skip hashing for the common case; the store still enforces uniqueness
        if state.users().email_exists(&req.email).await? {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let hashed_password = state.passwords().hash_async(req.password).await?;
        let user = state
            .users()
            .create(&req.email, &hashed_password)
            .await
            .map_err(conflict_on_duplicate)?;

        info!(user_id = %user.id, "User registered");
        Ok(user.to_response())
    }

    /// Replace the caller's email and password
    ///
    /// The target account is always the caller's own.
    pub async fn update(
        state: &AppState,
        caller: Identity,
        req: UpdateUserRequest,
    ) -> ApiResult<UserResponse> {
        req.validate()?;

        if let Some(existing) = state.users().find_by_email(&req.email).await? {
            if existing.id != caller {
                return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }

        let hashed_password = state.passwords().hash_async(req.password).await?;
        let updated = state
            .users()
            .update_credentials(caller, &req.email, &hashed_password)
            .await
            .map_err(conflict_on_duplicate)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %caller, "User credentials updated");
        Ok(updated.to_response())
    }

    /// Handle a payment webhook. Only `user.upgraded` has an effect.
    pub async fn upgrade_from_webhook(
        state: &AppState,
        headers: &HeaderMap,
        req: WebhookRequest,
    ) -> ApiResult<()> {
        state.guard().authorize_webhook(headers)?;

        if req.event != USER_UPGRADED_EVENT {
            debug!(event = %req.event, "Ignoring webhook event");
            return Ok(());
        }

        let user_id: Identity = req
            .data
            .user_id
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

        state
            .users()
            .upgrade_to_red(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %user_id, "User upgraded to Chirpy Red");
        Ok(())
    }

    /// Reset hit counter and delete every user, chirp and refresh token.
    /// Only allowed on the `dev` platform.
    pub async fn reset(state: &AppState) -> ApiResult<()> {
        if !state.config().is_dev_platform() {
            return Err(ApiError::Forbidden(
                "Reset is only allowed in dev environment".to_string(),
            ));
        }

        state.hits().reset();
        state.refresh_tokens().clear().await?;
        state.chirps().delete_all().await?;
        let users = state.users().delete_all().await?;

        info!(users, "Store reset");
        Ok(())
    }
}

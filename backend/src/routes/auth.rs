//! Session routes
//!
//! Provides endpoints for login, session refresh and refresh-token revocation.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password verification runs on blocking thread pool

use crate::error::ApiResult;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chirpy_shared::types::{LoginRequest, LoginResponse, RefreshResponse};

/// Create session routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
}

/// Login with email and password
///
/// POST /api/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let resp = AuthService::login(&state, req).await?;
    Ok(Json(resp))
}

/// Mint a new session token
///
/// POST /api/refresh
///
/// # Authentication
/// Requires the refresh token (not a session token) as Bearer token.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<RefreshResponse>> {
    let resp = AuthService::refresh(&state, &headers).await?;
    Ok(Json(resp))
}

/// Revoke a refresh token
///
/// POST /api/revoke
async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    AuthService::revoke(&state, &headers).await?;
    Ok(StatusCode::NO_CONTENT)
}

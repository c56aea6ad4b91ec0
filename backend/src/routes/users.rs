//! User account routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chirpy_shared::types::{CreateUserRequest, UpdateUserRequest, UserResponse};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user).put(update_user))
}

/// Register a new user
///
/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = UserService::register(&state, req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update the caller's email and password
///
/// PUT /api/users
///
/// # Authentication
/// Requires valid Bearer session token in Authorization header.
async fn update_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::update(&state, auth_user.user_id, req).await?;
    Ok(Json(user))
}

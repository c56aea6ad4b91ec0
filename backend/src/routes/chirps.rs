//! Chirp routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ChirpService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chirpy_shared::types::{ChirpListQuery, ChirpResponse, CreateChirpRequest};

/// Create chirp routes
pub fn chirp_routes() -> Router<AppState> {
    Router::new()
        .route("/chirps", get(list_chirps).post(create_chirp))
        .route("/chirps/:chirp_id", get(get_chirp).delete(delete_chirp))
}

/// Post a chirp
///
/// POST /api/chirps
///
/// # Authentication
/// Requires valid Bearer session token. The author is always the caller.
async fn create_chirp(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateChirpRequest>,
) -> ApiResult<(StatusCode, Json<ChirpResponse>)> {
    let chirp = ChirpService::create(&state, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// List chirps
///
/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpListQuery>,
) -> ApiResult<Json<Vec<ChirpResponse>>> {
    let chirps = ChirpService::list(&state, query).await?;
    Ok(Json(chirps))
}

/// Get one chirp
///
/// GET /api/chirps/:chirp_id
async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> ApiResult<Json<ChirpResponse>> {
    let chirp = ChirpService::get(&state, &chirp_id).await?;
    Ok(Json(chirp))
}

/// Delete a chirp owned by the caller
///
/// DELETE /api/chirps/:chirp_id
async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    ChirpService::delete(&state, &headers, &chirp_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Payment provider webhooks

use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chirpy_shared::types::WebhookRequest;

/// Create webhook routes
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/polka/webhooks", post(polka_webhook))
}

/// Handle a Polka event
///
/// POST /api/polka/webhooks
///
/// # Authentication
/// Requires the configured API key as `Authorization: ApiKey <key>`.
async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WebhookRequest>,
) -> ApiResult<StatusCode> {
    UserService::upgrade_from_webhook(&state, &headers, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

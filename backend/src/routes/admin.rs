//! Admin and metrics endpoints

use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics_page))
        .route("/reset", post(reset))
}

/// File-server hit count as HTML
///
/// GET /admin/metrics
async fn metrics_page(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        state.hits().get()
    ))
}

/// Reset hits and delete all users
///
/// POST /admin/reset
async fn reset(State(state): State<AppState>) -> ApiResult<StatusCode> {
    UserService::reset(&state).await?;
    Ok(StatusCode::OK)
}

/// Prometheus exposition
///
/// GET /metrics
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

//! Route definitions for the Chirpy API
//!
//! This module organizes all API routes and applies middleware.

use crate::metrics::count_fileserver_hits;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod admin;
mod auth;
mod chirps;
mod health;
mod users;
mod webhooks;


pub use admin::admin_routes;
pub use auth::auth_routes;
pub use chirps::chirp_routes;
pub use users::user_routes;
pub use webhooks::webhook_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config().server.request_timeout_secs);

    Router::new()
        .route("/metrics", get(admin::prometheus_metrics))
        .nest("/api", api_routes())
        .nest("/admin", admin::admin_routes())
        .merge(fileserver(&state))
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/healthz/ready", get(health::readiness_check))
        .merge(auth::auth_routes())
        .merge(users::user_routes())
        .merge(chirps::chirp_routes())
        .merge(webhooks::webhook_routes())
}

/// Static files under `/app`, each request counted
fn fileserver(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest_service("/app", ServeDir::new(&state.config().server.static_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            count_fileserver_hits,
        ))
}

//! Chirpy Backend
//!
//! A small social-posting service: users, short posts ("chirps"),
//! JWT sessions with revocable refresh tokens and a payment webhook.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Auth: Password hashing, tokens and ownership checks
//! - Repositories: Data access (PostgreSQL or in-memory)

use anyhow::Result;
use chirpy_backend::{config, db, metrics, routes, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        platform = %config.platform,
        "Starting Chirpy Backend"
    );

    // Missing secrets are fatal
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        anyhow::bail!("Invalid configuration: {}", e);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Create application state
    let state = if config.uses_database() {
        info!("Connecting to database...");
        let db_pool = db::connect(&config.database).await?;

        // Run migrations (skip in production if using separate migration job)
        if !config::AppConfig::is_production() {
            db::migrate(&db_pool).await?;
        }

        AppState::new(db_pool, config)?
    } else {
        warn!("No database URL configured, using in-memory stores");
        AppState::in_memory(config)?
    };

    let state = match metrics::install_prometheus_recorder() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}. /metrics disabled.", e);
            state
        }
    };

    // Build application
    let app = routes::create_router(state);

    // Start server
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "chirpy_backend=info,tower_http=info".into()
        } else {
            "chirpy_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

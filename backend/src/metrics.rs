//! Serving-layer metrics
//!
//! - `chirpy_fileserver_hits_total` - Counter of requests to the static file server
//!
//! The admin page reads the in-process [`HitCounter`]; the same hits are also
//! recorded through the `metrics` facade for the Prometheus endpoint.

use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::info;

/// Prometheus name of the file-server hit counter
pub const FILESERVER_HITS: &str = "chirpy_fileserver_hits_total";

/// Atomically incremented request counter, shared across clones
#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

/// Middleware counting every request that reaches the file server
pub async fn count_fileserver_hits(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.hits().increment();
    metrics::counter!(FILESERVER_HITS).increment(1);
    next.run(request).await
}

/// Install the global Prometheus recorder. Call once at startup.
pub fn install_prometheus_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus recorder installed");
    Ok(handle)
}

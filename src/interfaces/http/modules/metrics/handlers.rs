//! Prometheus recorder and scrape endpoint

use std::sync::OnceLock;

use axum::{extract::State, http::header, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Handle to the process-wide Prometheus recorder, installing it on first use.
///
/// The global recorder can be installed only once per process, so a
/// restarted server reuses the first handle. `None` means another recorder
/// was installed elsewhere and `/metrics` stays disabled.
pub fn prometheus_handle() -> Option<PrometheusHandle> {
    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
            PROM_HANDLE.get().cloned()
        }
    }
}

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics` in Prometheus text exposition format, no auth.
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.handle.render(),
    )
}

//! Prometheus metrics
//!
//! Counters and histograms are recorded through the `metrics` facade across
//! the workspace; this module installs the exporter and serves `/metrics`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once per process
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = PROMETHEUS.get() {
        return Some(handle);
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(PROMETHEUS.get_or_init(|| handle)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        },
    }
}

/// Record an HTTP chat request
pub fn record_chat_request(path: &'static str) {
    metrics::counter!("chat_requests_total", "path" => path).increment(1);
}

/// Record a request error
pub fn record_error(kind: &'static str) {
    metrics::counter!("server_errors_total", "kind" => kind).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

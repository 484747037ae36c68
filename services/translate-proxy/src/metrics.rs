//! Prometheus metrics exposition
//!
//! - `http_requests_total` (counter): labels `route`, `method`, `status`
//! - `http_request_duration_seconds` (histogram): label `route`
//! - `upstream_errors_total` (counter): label `service`
//! - `credential_refresh_total` (counter): label `outcome`, recorded by the credentials crate

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// In-process counters backing the /health response.
#[derive(Clone)]
pub struct ServiceMetrics {
    pub requests_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            errors_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("http_request_duration_seconds".to_string()),
        DURATION_BUCKETS,
    )
}

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// `http_request_duration_seconds` gets explicit buckets (5ms to 60s) so it
/// renders as a histogram rather than a summary.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Handle backed by a recorder that is not installed globally.
#[cfg(test)]
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// Record a completed request.
pub fn record_request(route: &str, method: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "http_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record a failed call to Google (`google_oauth` or `translate`).
pub fn record_upstream_error(service: &'static str) {
    metrics::counter!("upstream_errors_total", "service" => service).increment(1);
}

//! Prometheus metrics implementation.
//!
//! Implements the `Metrics` trait by delegating to the helpers in
//! `counters.rs` and `recorder.rs`, which talk to the global `metrics`
//! registry. A single global handle renders everything that was recorded.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Stateless: all series live in the global registry.
#[derive(Default)]
pub struct PrometheusMetrics {}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_login(&self, method: &str) {
        tracing::debug!(method, "Recording login");
        super::increment_logins(method);
    }

    fn record_auth_rejected(&self) {
        super::increment_auth_rejections();
    }

    fn record_sessions_swept(&self, count: u64) {
        tracing::debug!(count, "Recording swept sessions");
        super::increment_sessions_swept(count);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}

mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use counters::{
    increment_auth_rejections, increment_logins, increment_sessions_swept, track_http_request,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a new Prometheus metrics implementation.
///
/// Metrics are collected in the global `metrics` registry and rendered in
/// Prometheus text format by the `/metrics` endpoint.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics()?;

    Ok(Arc::new(PrometheusMetrics::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_repeatable() {
        assert!(create().is_ok());
        assert!(create().is_ok());
    }

    #[test]
    fn test_recorded_counters_render() {
        let metrics = create().unwrap();
        metrics.record_login("password");
        metrics.record_auth_rejected();

        let text = metrics.render();
        assert!(text.contains("exptr_logins_total"));
        assert!(text.contains("exptr_auth_rejections_total"));
    }
}

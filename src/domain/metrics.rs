use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a successful login, labelled by method ("password" or "passkey").
    fn record_login(&self, method: &str);

    /// Record a rejected request at the auth gateway.
    fn record_auth_rejected(&self);

    /// Record how many sessions one sweep removed.
    fn record_sessions_swept(&self, count: u64);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;

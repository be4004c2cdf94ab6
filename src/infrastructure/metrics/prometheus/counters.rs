use metrics::{counter, histogram};
use std::time::Instant;

/// Successful logins, labelled by method (`password` or `passkey`).
pub fn increment_logins(method: &str) {
    counter!("exptr_logins_total", "method" => method.to_string()).increment(1);
}

/// Requests turned away by the bearer gate.
pub fn increment_auth_rejections() {
    counter!("exptr_auth_rejections_total").increment(1);
}

/// Sessions removed by the periodic sweep.
pub fn increment_sessions_swept(count: u64) {
    counter!("exptr_sessions_swept_total").increment(count);
}

/// Track HTTP request latency and count by route and status.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
    counter!(
        "http_requests_total",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use parking_lot::{const_mutex, Mutex};
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INIT: Mutex<()> = const_mutex(());

/// Install the Prometheus recorder globally and store the handle.
///
/// Only the first call installs; later calls reuse the stored handle.
pub fn init_metrics() -> Result<()> {
    let _guard = INIT.lock();
    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow!("Failed to install Prometheus recorder: {e}"))?;

    HANDLE
        .set(handle)
        .map_err(|_| anyhow!("Prometheus handle already stored"))
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    HANDLE.get().map(PrometheusHandle::render).unwrap_or_default()
}

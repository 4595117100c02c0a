//! Prometheus metrics

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Counter and gauge names emitted by the recorder
pub mod names {
    pub const REFRESH_TOTAL: &str = "p2p_refresh_total";
    pub const SAMPLES_RECORDED_TOTAL: &str = "p2p_samples_recorded_total";
    pub const RECORD_TICKS_SKIPPED_TOTAL: &str = "p2p_record_ticks_skipped_total";
    pub const STORE_ERRORS_TOTAL: &str = "p2p_store_errors_total";
    pub const VIEW_CACHE_SAMPLES: &str = "p2p_view_cache_samples";
}

/// Install the Prometheus exporter, serving `/metrics` on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    describe_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        names::REFRESH_TOTAL,
        "Quote refreshes per side and outcome"
    );
    describe_counter!(
        names::SAMPLES_RECORDED_TOTAL,
        "Samples written to the store"
    );
    describe_counter!(
        names::RECORD_TICKS_SKIPPED_TOTAL,
        "Recording ticks skipped because a side had no listings"
    );
    describe_counter!(
        names::STORE_ERRORS_TOTAL,
        "Failed store operations by operation"
    );
    describe_gauge!(
        names::VIEW_CACHE_SAMPLES,
        "Samples currently held in the view cache"
    );
}

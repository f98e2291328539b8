//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by mode and status
//! - `relay_request_duration_seconds` (histogram): end-to-end latency by mode
//! - `relay_upstream_duration_seconds` (histogram): upstream fetch latency
//! - `relay_zones_skipped_total` (counter): zone records dropped on export
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled request. `mode` is preflight, rejected, proxy or export.
pub fn record_request(mode: &'static str, status: StatusCode, start_time: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "mode" => mode,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "mode" => mode)
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_upstream_duration(started: Instant) {
    metrics::histogram!("relay_upstream_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_zones_skipped(count: usize) {
    if count > 0 {
        metrics::counter!("relay_zones_skipped_total").increment(count as u64);
    }
}

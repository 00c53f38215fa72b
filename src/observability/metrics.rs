//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): finished requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): admissions rejected
//! - `gateway_denied_targets_total` (counter): targets rejected, by reason
//!
//! # Design Decisions
//! - Metric updates are cheap atomic operations; recording is safe on the
//!   hot path whether or not the exporter is installed
//! - The Prometheus endpoint runs on its own address, off the proxy port

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter. Called once from startup when metrics
/// are enabled; failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by admission control.
pub fn record_rate_limited(reason: &'static str) {
    metrics::counter!("gateway_rate_limited_total", "reason" => reason).increment(1);
}

/// Record a target denied by the validator.
pub fn record_denied_target(reason: &'static str) {
    metrics::counter!("gateway_denied_targets_total", "reason" => reason).increment(1);
}

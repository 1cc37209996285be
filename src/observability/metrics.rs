//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, verdict
//! - `proxy_request_duration_seconds` (histogram): latency by verdict
//!
//! Without an installed recorder the macros are no-ops.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::RequestEvent;

/// Start the Prometheus scrape endpoint. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(event: &RequestEvent) {
    let verdict = event.verdict.as_str();
    metrics::counter!(
        "proxy_requests_total",
        "method" => event.method.to_string(),
        "status" => event.status.as_u16().to_string(),
        "verdict" => verdict
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "verdict" => verdict)
        .record(event.duration.as_secs_f64());
}

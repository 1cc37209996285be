//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Write one access log line per completed request
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - RUST_LOG overrides the configured level

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::observability::{metrics, EventSink, RequestEvent};

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// The production event sink: access log line plus metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLog;

impl EventSink for AccessLog {
    fn record(&self, event: &RequestEvent) {
        tracing::info!(
            target: "intercept_proxy::access",
            timestamp = %event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            method = %event.method,
            path = %event.path,
            verdict = %event.verdict,
            reason = event.reason.as_deref().unwrap_or("-"),
            duration_ms = event.duration_ms(),
            status = event.status.as_u16(),
            "Request handled"
        );
        metrics::record_request(event);
    }
}

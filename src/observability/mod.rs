//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ForwardingGateway (one RequestEvent per completed request)
//!     → EventSink
//!         → logging.rs (AccessLog: structured tracing event + metrics)
//!         → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The gateway only knows the EventSink trait; formatting lives here
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

use std::sync::Mutex;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};

use crate::http::response::{ProxyResponse, Verdict};

/// Summary of one completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEvent {
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    /// Path as received, before mount stripping.
    pub path: String,
    pub verdict: Verdict,
    /// Short-circuit reason, if any.
    pub reason: Option<String>,
    pub duration: Duration,
    pub status: StatusCode,
}

impl RequestEvent {
    pub fn new(method: Method, path: String, response: &ProxyResponse, duration: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            method,
            path,
            verdict: response.verdict,
            reason: response.reason.clone(),
            duration,
            status: response.status,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }
}

/// Receives one event per completed request.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &RequestEvent);
}

/// Keeps events in memory. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RequestEvent>>,
}

impl MemorySink {
    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<RequestEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &RequestEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

pub use logging::AccessLog;

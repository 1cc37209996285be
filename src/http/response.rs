//! Response representation handed back to the client.
//!
//! # Responsibilities
//! - Carry status, filtered headers and body out of the gateway
//! - Tag every response with how it was produced (verdict)
//! - Convert into an axum response
//!
//! # Design Decisions
//! - Bodies are fully buffered (upstream bodies are already decompressed)
//! - JSON bodies always carry an explicit `Content-Type: application/json`

use std::fmt;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// How a response was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Forwarded to the upstream (including failed upstream attempts).
    Proxied,
    /// Refused by the proxy.
    Blocked,
    /// Answered with a canned document.
    Synthesized,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Proxied => "proxied",
            Verdict::Blocked => "blocked",
            Verdict::Synthesized => "synthesized",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete response produced for one request.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub verdict: Verdict,
    /// Why the request was short-circuited, if it was.
    pub reason: Option<String>,
}

impl ProxyResponse {
    /// Serialize `payload` as a JSON response.
    pub fn json<T: Serialize>(status: StatusCode, payload: &T, verdict: Verdict) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let body = match serde_json::to_vec(payload) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                // Only reachable with a non-string map key; the payload types here have none.
                tracing::error!(error = %e, "Failed to serialize response payload");
                Bytes::from_static(b"{}")
            }
        };

        Self {
            status,
            headers,
            body,
            verdict,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Parse the body as JSON (used by tests and diagnostics).
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

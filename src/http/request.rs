//! Request capture.
//!
//! # Responsibilities
//! - Buffer the full inbound body before anything else runs
//! - Resolve the mount-relative path used for matching and forwarding
//! - Work out the origin the client reached us on (for discovery)
//!
//! # Design Decisions
//! - Matching path is percent-decoded; forwarding path stays as sent
//! - Original headers are kept in order; sanitizing happens at forward time

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, Method};

use crate::routing::matcher::{decode, MountPrefix};

/// Everything the gateway needs about one inbound request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Mount-relative, percent-decoded path with one leading slash.
    pub path: String,
    /// Mount-relative path as sent by the client, used upstream.
    pub upstream_path: String,
    /// Raw query string, without `?`.
    pub query: Option<String>,
    /// Inbound headers, including `Cookie`.
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Content-Type value, empty when absent or not visible ASCII.
    pub content_type: String,
    /// `scheme://host` as seen by the client.
    pub origin: String,
}

/// Why a request never reached rule evaluation.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    /// Body larger than the limit, or the client stopped sending it.
    #[error("request body could not be read within {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("path is outside the mount prefix")]
    OutsideMount,

    /// The inbound deadline passed before a response was ready.
    #[error("request not completed within {0:?}")]
    TimedOut(Duration),
}

impl ProxyRequest {
    /// Buffer the body and build a request relative to `mount`.
    ///
    /// When `resolve_path` returns `None` for a path outside the mount the
    /// request is rejected.
    pub async fn capture(
        parts: Parts,
        body: Body,
        max_body_bytes: usize,
        resolve_path: impl FnOnce(&Method, &str) -> Option<String>,
    ) -> Result<Self, Rejection> {
        let body = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(|_| Rejection::PayloadTooLarge {
                limit: max_body_bytes,
            })?;

        let upstream_path =
            resolve_path(&parts.method, parts.uri.path()).ok_or(Rejection::OutsideMount)?;
        let path = decode(&upstream_path).into_owned();

        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            origin: request_origin(&parts),
            method: parts.method,
            path,
            upstream_path,
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
            content_type,
        })
    }
}

/// Map a raw path to its mount-relative form, honoring the unprefixed
/// discovery route.
pub fn mount_resolver<'a>(
    mount: &'a MountPrefix,
    unprefixed_discovery: Option<&'a str>,
) -> impl FnOnce(&Method, &str) -> Option<String> + 'a {
    move |method, raw_path| {
        mount.strip(raw_path).or_else(|| {
            let discovery = unprefixed_discovery?;
            let is_discovery = *method == Method::GET
                && decode(raw_path).trim_start_matches('/') == discovery.trim_start_matches('/');
            is_discovery.then(|| raw_path.to_string())
        })
    }
}

/// `scheme://host` the client used to reach the proxy.
///
/// Scheme comes from an absolute request URI, then `X-Forwarded-Proto`, then
/// defaults to http. Host comes from the Host header, then the URI authority.
pub fn request_origin(parts: &Parts) -> String {
    let scheme = parts
        .uri
        .scheme_str()
        .map(str::to_string)
        .or_else(|| {
            parts
                .headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|v| v.trim().to_ascii_lowercase())
        })
        .unwrap_or_else(|| "http".to_string());

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    format!("{scheme}://{host}")
}

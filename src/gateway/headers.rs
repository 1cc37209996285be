//! Header reconciliation between the client and upstream legs.
//!
//! # Responsibilities
//! - Copy inbound headers upstream with `Host` replaced
//! - Keep `Content-Length` in step with a rewritten body
//! - Drop encoding headers from upstream responses
//!
//! # Design Decisions
//! - Header names are compared through `HeaderName`, so case never matters
//! - Multi-valued headers keep every value and their order

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::transform::TransformedBody;

/// Upstream response headers never copied to the client.
///
/// The upstream body has already been decoded, so its encoding headers no
/// longer describe what the client receives.
pub const STRIPPED_RESPONSE_HEADERS: [HeaderName; 2] =
    [header::CONTENT_ENCODING, header::TRANSFER_ENCODING];

/// Headers for the upstream request.
pub fn outbound_request_headers(
    inbound: &HeaderMap,
    upstream_host: &HeaderValue,
    body: &TransformedBody,
) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if name != header::HOST {
            headers.append(name.clone(), value.clone());
        }
    }
    headers.insert(header::HOST, upstream_host.clone());

    if body.modified && headers.contains_key(header::CONTENT_LENGTH) {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.bytes.len()));
    }
    headers
}

/// Headers for the client response, built from the upstream response.
pub fn client_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !STRIPPED_RESPONSE_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

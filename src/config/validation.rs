//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject rule paths that could never match
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("upstream.scheme must be http or https, got `{0}`")]
    UpstreamScheme(String),

    #[error("upstream.domain must be a non-empty header value")]
    UpstreamDomain,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("timeouts.request_secs ({request}) must exceed upstream.timeout_secs ({upstream})")]
    TimeoutOrder { request: u64, upstream: u64 },

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("routing.mount_prefix `{0}` contains route syntax characters")]
    MountPrefix(String),

    #[error("rewrite.from must not be empty")]
    EmptyRewriteToken,
}

/// Check a parsed configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    if upstream.scheme != "http" && upstream.scheme != "https" {
        errors.push(ValidationError::UpstreamScheme(upstream.scheme.clone()));
    }
    if upstream.domain.trim().is_empty() || HeaderValue::from_str(&upstream.domain).is_err() {
        errors.push(ValidationError::UpstreamDomain);
    }
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    // The inbound deadline must leave room for the upstream one to fire first.
    if upstream.timeout_secs > 0 && config.timeouts.request_secs <= upstream.timeout_secs {
        errors.push(ValidationError::TimeoutOrder {
            request: config.timeouts.request_secs,
            upstream: upstream.timeout_secs,
        });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }

    let routing = &config.routing;
    for (name, path) in [
        ("routing.discovery_path", &routing.discovery_path),
        ("routing.blocked_prefix", &routing.blocked_prefix),
        ("routing.preset_path", &routing.preset_path),
    ] {
        if path.trim_start_matches('/').is_empty() {
            errors.push(ValidationError::EmptyPath(name));
        }
    }
    if routing
        .mount_prefix
        .chars()
        .any(|c| matches!(c, '{' | '}' | '*' | '?' | '#'))
    {
        errors.push(ValidationError::MountPrefix(routing.mount_prefix.clone()));
    }

    if config.rewrite.from.is_empty() {
        errors.push(ValidationError::EmptyRewriteToken);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

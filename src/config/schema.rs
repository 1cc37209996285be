//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the intercepting proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream origin requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Mount prefix and interception rule constants.
    pub routing: RoutingConfig,

    /// Canned response content.
    pub responses: ResponsesConfig,

    /// Request body token substitution.
    pub rewrite: RewriteConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Upstream origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// "http" or "https".
    pub scheme: String,

    /// Upstream authority. Also sent verbatim as the `Host` header.
    pub domain: String,

    /// Upper bound for one upstream exchange, in seconds.
    pub timeout_secs: u64,

    /// Honor HTTP(S)_PROXY environment variables for the upstream leg.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            domain: "sxz.api.zykj.org".to_string(),
            timeout_secs: 10,
            use_system_proxy: false,
        }
    }
}

impl UpstreamConfig {
    /// Origin URL without a trailing slash, e.g. `http://example.org`.
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }
}

/// Routing configuration: mount prefix and the three interception paths.
///
/// Rule priority is fixed in code (discovery, protected prefix, preset);
/// only the path constants are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path segment the proxy is mounted under (e.g. "/zykj"). Empty mounts at root.
    pub mount_prefix: String,

    /// Also answer GET on the discovery path outside the mount prefix.
    pub expose_unprefixed_discovery: bool,

    /// Exact path answered with the discovery document (GET only).
    pub discovery_path: String,

    /// Every path under this prefix is rejected with 403.
    pub blocked_prefix: String,

    /// Exact path answered with the canned policy document.
    pub preset_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mount_prefix: String::new(),
            expose_unprefixed_discovery: true,
            discovery_path: "/api/discovery/sxz".to_string(),
            blocked_prefix: "/api/services/app/[WebWhiteList]/".to_string(),
            preset_path: "/api/services/app/CtrlStrategy/GetControlPolicyByDeviceNumberAsync"
                .to_string(),
        }
    }
}

/// Content of the synthesized responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponsesConfig {
    /// `name` field of the discovery document.
    pub discovery_name: String,

    /// `lcid` field of the discovery document.
    pub discovery_lcid: String,

    /// `error.message` of the 403 document.
    pub blocked_message: String,

    /// `error.details` of the 403 document.
    pub blocked_details: String,
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            discovery_name: "江苏省锡中".to_string(),
            discovery_lcid: "6ee30ace-f3c3-4ed0-a1b8-ce2855c9eb99".to_string(),
            blocked_message: "访问被禁止".to_string(),
            blocked_details: "该接口已禁用".to_string(),
        }
    }
}

/// Literal token substitution applied to textual request bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Token searched for (case-sensitive).
    pub from: String,

    /// Replacement text.
    pub to: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            from: "deviceNumber".to_string(),
            to: "dn".to_string(),
        }
    }
}

/// Timeout configuration for the inbound side.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body buffered for rewriting, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Canned JSON responses for intercepted requests.

use axum::http::StatusCode;
use serde::Serialize;

use crate::config::ResponsesConfig;
use crate::http::request::ProxyRequest;
use crate::http::response::{ProxyResponse, Verdict};
use crate::routing::{MountPrefix, RuleKind};

#[derive(Debug, Serialize)]
struct DiscoveryDocument<'a> {
    name: &'a str,
    server: String,
    lcid: &'a str,
}

#[derive(Debug, Serialize)]
struct BlockedDocument<'a> {
    success: bool,
    error: ErrorInfo<'a>,
    #[serde(rename = "__abp")]
    abp: bool,
}

#[derive(Debug, Serialize)]
struct ErrorInfo<'a> {
    code: u16,
    message: &'a str,
    details: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetDocument {
    result: PresetResult,
    target_url: Option<String>,
    success: bool,
    error: Option<()>,
    un_authorized_request: bool,
    #[serde(rename = "__abp")]
    abp: bool,
}

#[derive(Debug, Serialize)]
struct PresetResult {
    #[serde(rename = "type")]
    kind: u8,
    policies: Vec<()>,
}

/// Body of a gateway-level failure (502, 404, 413).
#[derive(Debug, Serialize)]
pub struct FailureDocument {
    pub success: bool,
    pub error: String,
}

impl FailureDocument {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Builds the short-circuit response for each rule kind.
#[derive(Debug, Clone)]
pub struct ResponseSynthesizer {
    responses: ResponsesConfig,
    mount: MountPrefix,
}

impl ResponseSynthesizer {
    pub fn new(responses: ResponsesConfig, mount: MountPrefix) -> Self {
        Self { responses, mount }
    }

    pub fn synthesize(&self, kind: RuleKind, request: &ProxyRequest) -> ProxyResponse {
        let response = match kind {
            RuleKind::Discovery => ProxyResponse::json(
                StatusCode::OK,
                &DiscoveryDocument {
                    name: &self.responses.discovery_name,
                    server: format!("{}/{}", request.origin, self.mount.suffix()),
                    lcid: &self.responses.discovery_lcid,
                },
                Verdict::Synthesized,
            ),
            RuleKind::BlockedPrefix => ProxyResponse::json(
                StatusCode::FORBIDDEN,
                &BlockedDocument {
                    success: false,
                    error: ErrorInfo {
                        code: StatusCode::FORBIDDEN.as_u16(),
                        message: &self.responses.blocked_message,
                        details: &self.responses.blocked_details,
                    },
                    abp: true,
                },
                Verdict::Blocked,
            ),
            RuleKind::Preset => ProxyResponse::json(
                StatusCode::OK,
                &PresetDocument {
                    result: PresetResult {
                        kind: 4,
                        policies: Vec::new(),
                    },
                    target_url: None,
                    success: true,
                    error: None,
                    un_authorized_request: false,
                    abp: true,
                },
                Verdict::Synthesized,
            ),
        };
        response.with_reason(kind.reason())
    }
}

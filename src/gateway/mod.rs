//! Request interception and forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! Received        capture start time, buffer body, resolve mount-relative path
//!     → BodyTransformed   transform::BodyTransformer (always runs)
//!     → RuleEvaluated     routing::RuleSet
//!         → ShortCircuited    synthesize.rs (no network)
//!         → UpstreamCalled    headers.rs + upstream.rs (502 on failure)
//!     → Completed         one RequestEvent to the EventSink
//! ```
//!
//! The whole pipeline runs under `timeouts.request_secs`; a request that
//! misses the deadline (usually a stalled body) still completes with a 408.
//!
//! # Design Decisions
//! - Exactly one of the short-circuit and upstream branches runs per request
//! - Shared state is read-only; requests never coordinate
//! - No retries; one failed upstream attempt is terminal

pub mod headers;
pub mod synthesize;
pub mod upstream;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};

use crate::config::ProxyConfig;
use crate::http::request::{mount_resolver, ProxyRequest, Rejection};
use crate::http::response::{ProxyResponse, Verdict};
use crate::observability::{EventSink, RequestEvent};
use crate::routing::{MountPrefix, RuleSet};
use crate::transform::BodyTransformer;

use self::headers::{client_response_headers, outbound_request_headers};
use self::synthesize::{FailureDocument, ResponseSynthesizer};
use self::upstream::{UpstreamClient, UpstreamSetupError};

/// Prefix of the 502 error string, kept for deployed clients.
const UPSTREAM_FAILURE_PREFIX: &str = "代理请求失败";

/// Errors constructing the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Upstream(#[from] UpstreamSetupError),
}

/// Orchestrates the lifecycle of every proxied request.
pub struct ForwardingGateway {
    mount: MountPrefix,
    unprefixed_discovery: Option<String>,
    max_body_bytes: usize,
    request_timeout: Duration,
    transformer: BodyTransformer,
    rules: RuleSet,
    synthesizer: ResponseSynthesizer,
    upstream: UpstreamClient,
    sink: Arc<dyn EventSink>,
}

impl ForwardingGateway {
    pub fn new(config: &ProxyConfig, sink: Arc<dyn EventSink>) -> Result<Self, GatewayError> {
        let mount = MountPrefix::new(&config.routing.mount_prefix);
        let unprefixed_discovery = config
            .routing
            .expose_unprefixed_discovery
            .then(|| config.routing.discovery_path.clone());

        Ok(Self {
            synthesizer: ResponseSynthesizer::new(config.responses.clone(), mount.clone()),
            mount,
            unprefixed_discovery,
            max_body_bytes: config.limits.max_body_bytes,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            transformer: BodyTransformer::from_config(&config.rewrite),
            rules: RuleSet::from_config(&config.routing),
            upstream: UpstreamClient::new(&config.upstream)?,
            sink,
        })
    }

    /// Handle one inbound request end to end.
    ///
    /// Always returns a response and always records exactly one event.
    pub async fn handle(&self, request: Request<Body>) -> ProxyResponse {
        let started = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let (parts, body) = request.into_parts();
        let resolver = mount_resolver(&self.mount, self.unprefixed_discovery.as_deref());
        let pipeline = async {
            match ProxyRequest::capture(parts, body, self.max_body_bytes, resolver).await {
                Ok(request) => self.dispatch(request).await,
                Err(rejection) => reject(rejection),
            }
        };
        let response = match tokio::time::timeout(self.request_timeout, pipeline).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(method = %method, path = %path, "Request deadline exceeded");
                reject(Rejection::TimedOut(self.request_timeout))
            }
        };

        self.sink
            .record(&RequestEvent::new(method, path, &response, started.elapsed()));
        response
    }

    /// Transform, evaluate rules, then short-circuit or forward.
    pub async fn dispatch(&self, request: ProxyRequest) -> ProxyResponse {
        let body = self
            .transformer
            .transform(request.body.clone(), &request.content_type);

        if let Some(kind) = self.rules.evaluate(&request.method, &request.path) {
            tracing::debug!(rule = %kind, path = %request.path, "Request short-circuited");
            return self.synthesizer.synthesize(kind, &request);
        }

        let headers = outbound_request_headers(&request.headers, self.upstream.host(), &body);
        match self
            .upstream
            .send(
                request.method.clone(),
                &request.upstream_path,
                request.query.as_deref(),
                headers,
                body.bytes,
            )
            .await
        {
            Ok(upstream) => ProxyResponse {
                status: upstream.status,
                headers: client_response_headers(&upstream.headers),
                body: upstream.body,
                verdict: Verdict::Proxied,
                reason: None,
            },
            Err(e) => {
                tracing::error!(
                    method = %request.method,
                    path = %request.path,
                    error = %e,
                    "Upstream error"
                );
                ProxyResponse::json(
                    StatusCode::BAD_GATEWAY,
                    &FailureDocument::new(format!("{UPSTREAM_FAILURE_PREFIX}: {e}")),
                    Verdict::Proxied,
                )
            }
        }
    }
}

fn reject(rejection: Rejection) -> ProxyResponse {
    let status = match rejection {
        Rejection::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        Rejection::OutsideMount => StatusCode::NOT_FOUND,
        Rejection::TimedOut(_) => StatusCode::REQUEST_TIMEOUT,
    };
    let message = rejection.to_string();
    ProxyResponse::json(status, &FailureDocument::new(message.clone()), Verdict::Blocked)
        .with_reason(message)
}

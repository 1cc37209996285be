//! Outbound HTTP leg to the single upstream origin.
//!
//! # Responsibilities
//! - Build the upstream URL from the mount-relative path and raw query
//! - Enforce the upstream timeout on the whole exchange
//! - Hand back status, headers and the fully read body
//!
//! # Design Decisions
//! - Redirects are never followed; 3xx responses are returned as-is
//! - Compressed bodies are decoded by the client (gzip, deflate, brotli)
//! - A single attempt per request; no retries

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::config::UpstreamConfig;

/// Failures of the outbound leg.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL `{url}`: {source}")]
    Url {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(#[source] reqwest::Error),
}

/// Errors building the upstream client at startup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamSetupError {
    #[error("upstream domain `{0}` is not a valid Host header")]
    InvalidHost(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A buffered upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Client for the configured upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    origin: String,
    host: HeaderValue,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let host = HeaderValue::from_str(&config.domain)
            .map_err(|_| UpstreamSetupError::InvalidHost(config.domain.clone()))?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            origin: config.origin(),
            host,
            timeout,
        })
    }

    /// Value sent as the `Host` header on every upstream request.
    pub fn host(&self) -> &HeaderValue {
        &self.host
    }

    fn url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(query) => format!("{}{}?{}", self.origin, path, query),
            None => format!("{}{}", self.origin, path),
        }
    }

    /// Send one request upstream and read the whole response.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.url(path, query);
        let request = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(|source| UpstreamError::Url {
                url: url.clone(),
                source,
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }

    fn classify(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Transport(error)
        }
    }
}

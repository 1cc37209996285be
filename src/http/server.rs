//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the gateway on every path
//! - Restrict the accepted methods
//! - Wire up request tracing
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::gateway::{ForwardingGateway, GatewayError};
use crate::observability::{AccessLog, EventSink};

/// Methods the proxy accepts; anything else is answered with 405.
const PROXIED_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::HEAD)
    .or(MethodFilter::OPTIONS);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ForwardingGateway>,
}

/// HTTP server for the intercepting proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that logs requests through [`AccessLog`].
    pub fn new(config: ProxyConfig) -> Result<Self, GatewayError> {
        Self::with_sink(config, Arc::new(AccessLog))
    }

    /// Create a server reporting completed requests to `sink`.
    pub fn with_sink(config: ProxyConfig, sink: Arc<dyn EventSink>) -> Result<Self, GatewayError> {
        let gateway = Arc::new(ForwardingGateway::new(&config, sink)?);
        let router = Self::build_router(AppState { gateway });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// No timeout layer: the gateway owns the inbound deadline.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", on(PROXIED_METHODS, intercept_handler))
            .route("/", on(PROXIED_METHODS, intercept_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.origin(),
            mount_prefix = %self.config.routing.mount_prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request goes through the gateway.
async fn intercept_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.gateway.handle(request).await.into_response()
}

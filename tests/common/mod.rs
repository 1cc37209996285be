//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use intercept_proxy::config::ProxyConfig;
use intercept_proxy::observability::MemorySink;
use intercept_proxy::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A request as observed by the stub upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = dyn Fn(&Captured) -> Response + Send + Sync;

#[derive(Clone)]
struct StubState {
    captured: Arc<Mutex<Vec<Captured>>>,
    calls: Arc<AtomicUsize>,
    respond: Arc<Responder>,
}

/// Handle on a running stub upstream.
pub struct StubUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
    calls: Arc<AtomicUsize>,
}

impl StubUpstream {
    /// Number of requests that reached the stub.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last(&self) -> Option<Captured> {
        self.captured.lock().unwrap().last().cloned()
    }
}

async fn record(State(state): State<StubState>, request: Request<Body>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let captured = Captured {
        method: parts.method,
        uri: parts.uri,
        headers: parts.headers,
        body,
    };
    let response = (state.respond)(&captured);
    state.captured.lock().unwrap().push(captured);
    response
}

/// Start a programmable stub upstream on an ephemeral port.
pub async fn start_stub<F>(respond: F) -> StubUpstream
where
    F: Fn(&Captured) -> Response + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let captured = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let state = StubState {
        captured: captured.clone(),
        calls: calls.clone(),
        respond: Arc::new(respond),
    };

    let app = Router::new().fallback(record).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    StubUpstream {
        addr,
        captured,
        calls,
    }
}

/// Stub upstream that echoes the request body back with status 200.
pub async fn start_echo_stub() -> StubUpstream {
    start_stub(|captured| (StatusCode::OK, captured.body.clone()).into_response()).await
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A running proxy instance.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub sink: Arc<MemorySink>,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config forwarding to `upstream`, otherwise defaults.
pub fn config_for(upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.domain = upstream.to_string();
    config.upstream.timeout_secs = 2;
    config
}

/// Start the proxy with `config` on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let sink = Arc::new(MemorySink::default());
    let server = HttpServer::with_sink(config, sink.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestProxy {
        addr,
        sink,
        shutdown,
    }
}

/// Client that neither follows redirects nor uses environment proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

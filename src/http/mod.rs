//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, method filter, tracing)
//!     → gateway (interception pipeline, inbound deadline)
//!         → request.rs (buffer body, resolve mount-relative path, origin)
//!         → response.rs (ProxyResponse, verdict)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::ProxyRequest;
pub use response::{ProxyResponse, Verdict};
pub use server::HttpServer;

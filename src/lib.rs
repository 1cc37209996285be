//! Intercepting reverse proxy for a single upstream API host.
//!
//! Requests are matched against a fixed, ordered set of interception rules.
//! Matches are answered locally with canned JSON; everything else is
//! forwarded upstream with its textual body rewritten.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod transform;

pub use config::schema::ProxyConfig;
pub use gateway::ForwardingGateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

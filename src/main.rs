//! Intercepting Reverse Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────────┐
//!                          │                 INTERCEPT PROXY                   │
//!                          │                                                   │
//!     Client Request       │  ┌─────────┐    ┌───────────┐    ┌────────────┐   │
//!     ─────────────────────┼─▶│  http   │───▶│ transform │───▶│  routing   │   │
//!                          │  │ server  │    │   body    │    │   rules    │   │
//!                          │  └─────────┘    └───────────┘    └─────┬──────┘   │
//!                          │                                  match │ no match │
//!                          │                         ┌──────────────┴───┐      │
//!                          │                         ▼                  ▼      │
//!                          │                  ┌────────────┐    ┌────────────┐  │
//!     Client Response      │                  │ synthesize │    │  upstream  │◀─┼──── Upstream
//!     ◀────────────────────┼──────────────────│ canned JSON│    │   client   │  │     API host
//!                          │                  └────────────┘    └────────────┘  │
//!                          │                                                   │
//!                          │  config · observability (access log, metrics)     │
//!                          │  lifecycle (signals, graceful shutdown)           │
//!                          └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use intercept_proxy::config::{self, ProxyConfig};
use intercept_proxy::observability::{logging, metrics};
use intercept_proxy::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "intercept-proxy")]
#[command(author, version, about = "Intercepting reverse proxy for a single upstream API host")]
struct Args {
    /// Configuration file path (TOML). Defaults are used when omitted.
    #[arg(short, long, env = "INTERCEPT_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,

    /// Override upstream.domain.
    #[arg(long)]
    upstream: Option<String>,

    /// Output logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn load(args: &Args) -> Result<ProxyConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(upstream) = &args.upstream {
        config.upstream.domain = upstream.clone();
    }
    if args.json_logs {
        config.observability.json_logs = true;
    }

    config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability);
    tracing::info!("intercept-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin(),
        upstream_timeout_secs = config.upstream.timeout_secs,
        mount_prefix = %config.routing.mount_prefix,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

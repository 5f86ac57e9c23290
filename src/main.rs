//! Embedding Forward Proxy
//!
//! ```text
//!     Browser / iframe                      frame-proxy                          Upstream
//!     ────────────────  GET /proxy?url=…  ┌────────────────────────────┐  GET   ─────────
//!                      ─────────────────▶ │ dispatcher → fetcher       │ ─────▶  target
//!                                         │                            │
//!                      ◀───────────────── │ sanitize → cookies → links │ ◀─────
//!                        embeddable page  └────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frame_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use frame_proxy::lifecycle::signals::spawn_signal_listener;
use frame_proxy::observability::{logging, metrics};
use frame_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "frame-proxy", version)]
#[command(about = "Forward proxy that makes pages embeddable and keeps navigation proxied", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "FRAME_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides the configuration file)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

fn resolve_config(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability);

    tracing::info!("frame-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_connections = config.listener.max_connections,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        insecure_dev_mode = config.cookies.insecure_dev_mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address was checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

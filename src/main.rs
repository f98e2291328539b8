//! geozone-relay
//!
//! A small CORS relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                GEOZONE RELAY                 │
//!   Browser request      │  ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//!   ?url=..&export=..  ──┼─▶│  http   │───▶│ router  │───▶│  relay   │──┼──▶ Upstream
//!                        │  │ server  │    │         │    │ (GET)    │  │
//!                        │  └─────────┘    └─────────┘    └────┬─────┘  │
//!                        │                                     │        │
//!                        │                      export + JSON  ▼        │
//!   Response + CORS      │                              ┌────────────┐  │
//!   ◀────────────────────┼──────────────────────────────│ transform  │  │
//!                        │                              │ zones→geo  │  │
//!                        │                              └────────────┘  │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use geozone_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use geozone_relay::http::HttpServer;
use geozone_relay::lifecycle::{signals, Shutdown};
use geozone_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "geozone-relay", version)]
#[command(about = "CORS relay with optional zone-to-GeoJSON export", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("geozone-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        export_filename = %config.export.filename,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let _signal_task = signals::spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

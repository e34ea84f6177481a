//! Worker Router
//!
//! A JSON request router in front of a pool of worker instances.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌────────────────────────────────────────────────┐
//!                  │                 WORKER ROUTER                  │
//!   POST /route    │  ┌─────────┐   ┌──────────┐   ┌─────────────┐  │
//!  ────────────────┼─▶│  http   │──▶│ routing  │──▶│load_balancer│  │
//!                  │  │ server  │   │  engine  │   │ round robin │  │
//!                  │  └─────────┘   └────┬─────┘   └──────┬──────┘  │
//!                  │                     │ failure        │ skip    │
//!                  │                     ▼                ▼         │
//!                  │               ┌───────────────────────────┐    │
//!                  │               │   health::InstanceTracker │    │
//!                  │               └───────────────────────────┘    │
//!                  │                     ▲ recover                  │
//!                  │               ┌─────┴──────┐                   │     Workers
//!                  │               │health probe│── GET /health ────┼────▶
//!                  │               └────────────┘                   │
//!                  │  upstream client ──────── POST /process ───────┼────▶
//!                  └────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use worker_router::config::{load_config, validate_config, ConfigError, RouterConfig};
use worker_router::lifecycle::{wait_for_signal, Shutdown};
use worker_router::observability::{logging, metrics};
use worker_router::HttpServer;

#[derive(Parser)]
#[command(name = "worker-router")]
#[command(about = "Routes JSON requests across worker instances", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "WORKER_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<RouterConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("worker-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        algorithm = %config.balancer.algorithm,
        instances = ?config.balancer.instances,
        probe_interval_secs = config.health_check.interval_secs,
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
    let server_task = tokio::spawn(server.run(listener, shutdown.clone()));

    wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}

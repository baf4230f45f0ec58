//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 LOAD BALANCER                │
//!   Client Request      │  ┌─────────┐    ┌───────────┐   ┌──────────┐ │
//!   ────────────────────┼─▶│  http   │───▶│ forwarder │──▶│ selector │ │
//!                       │  │ server  │    │ (failover)│   │ (cursor) │ │
//!                       │  └─────────┘    └─────┬─────┘   └────┬─────┘ │
//!                       │                       │              │       │
//!                       │                       ▼              ▼       │
//!   Client Response     │                 ┌───────────────────────┐    │
//!   ◀───────────────────┼─────────────────│   backend registry    │◀───┼── health monitor
//!                       │                 │  (liveness per entry) │    │   (periodic probe)
//!                       │                 └───────────────────────┘    │
//!                       └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use round_robin_lb::config::load_config;
use round_robin_lb::lifecycle::startup;
use round_robin_lb::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "round-robin-lb")]
#[command(about = "Round-robin HTTP load balancer with health checks and failover", long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        listen = %config.listener.socket_addr(),
        backends = config.backends.len(),
        health_interval_secs = config.health_check.interval_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

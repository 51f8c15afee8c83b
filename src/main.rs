//! register-vulcan
//!
//! Sidecar that keeps a vulcand server entry synchronized with the health of
//! the instance it runs beside.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────── register-vulcan ───────────────────────────────┐
//!   │                                                                                 │
//!   │  ┌─────────┐  Reload/Terminate  ┌────────────┐  spawn/stop  ┌──────────────┐    │
//!   │  │ signals │───────────────────▶│ supervisor │─────────────▶│ control loop │    │
//!   │  └─────────┘                    └─────┬──────┘              └──────┬───────┘    │
//!   │                                       │ forced remove         ▲    │            │
//!   │  ┌─────────┐        Cycle (every 5s)  │                       │    │ probe      │
//!   │  │ ticker  │──────────────────────────┼───────────────────────┘    ▼            │
//!   │  └─────────┘                          │                     ┌──────────────┐    │
//!   │                                       │                     │ /healthcheck │────┼──▶ instance
//!   │                                       ▼                     └──────────────┘    │
//!   │                                ┌────────────┐   upsert / remove                 │
//!   │                                │  registry  │◀──────────────────────────────────┼──▶ vulcand
//!   │                                └────────────┘                                   │
//!   └─────────────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};

use register_vulcan::config::{self, Cli, ConfigError, SidecarConfig};
use register_vulcan::control::ControlLoop;
use register_vulcan::health::HttpProbe;
use register_vulcan::lifecycle::{spawn_signal_listener, Supervisor};
use register_vulcan::observability::{logging, metrics};
use register_vulcan::registry::VulcandRegistry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match config::load(Cli::parse()) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            let _ = Cli::command().print_help();
            eprintln!();
            for error in errors {
                eprintln!("  {error}");
            }
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "register-vulcan starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error, exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: SidecarConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        backend_id = %config.registration.key.backend_id,
        server_id = %config.registration.key.server_id,
        uri = %config.registration.target,
        vulcan_uri = %config.vulcan_uri,
        ttl = ?config.registration.ttl,
        upsert_policy = ?config.upsert_policy,
        "Configuration loaded"
    );

    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr)?;
    }

    let probe = HttpProbe::new()?;
    let registry = VulcandRegistry::new(config.vulcan_uri);
    let control_loop = ControlLoop::new(
        config.registration,
        Arc::new(probe),
        Arc::new(registry),
        config.upsert_policy,
    );

    let events = spawn_signal_listener()?;
    Supervisor::new(control_loop, config.timing).run(events).await?;
    Ok(())
}

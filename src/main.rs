//! tank-level: floating water tank level indicator.
//!
//! Startup sequence:
//! 1. Parses the command line and loads the layered configuration.
//! 2. Runs the startup gate (valid config, terminal attached for the overlay).
//! 3. Initializes logging for the chosen run mode.
//! 4. Runs the overlay, the headless daemon or the sensor simulator until
//!    the user quits or a shutdown signal arrives.

mod cli;
mod config;
mod error;
mod indicator;
mod level;
mod logging;
mod poller;
mod service;
mod simulator;
mod sources;
mod ui;

use anyhow::Result;

use cli::Cli;
use config::AppConfig;
use service::StartupGate;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_cli_overrides(&cli);

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let gate = StartupGate::check(&config, atty::is(atty::Stream::Stdout))?;
    logging::init(&config.logging, gate.mode)?;

    if gate.degraded {
        tracing::warn!("stdout is not a terminal, running headless instead of the overlay");
    }
    tracing::info!(mode = ?gate.mode, config = %cli.config.display(), "starting tank-level");

    service::run(config, gate.mode).await?;
    Ok(())
}

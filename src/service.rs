//! Service layer: startup gate, run modes and shutdown.
//!
//! This module wires a reading source, the poller and either the overlay or
//! the headless daemon together, and tears everything down at once on exit.

use futures_util::StreamExt;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, RunMode};
use crate::error::{Result, ServiceError};
use crate::level::LevelMapper;
use crate::poller::{Poller, Snapshot};
use crate::simulator;
use crate::sources::build_source;
use crate::ui::{self, App};

/// Outcome of the startup checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupGate {
    /// Mode the service will actually run in
    pub mode: RunMode,
    /// The requested overlay could not attach and fell back to daemon mode
    pub degraded: bool,
}

impl StartupGate {
    /// Validate the configuration and decide the run mode
    pub fn check(config: &AppConfig, stdout_is_terminal: bool) -> Result<Self> {
        config.validate()?;

        let requested = config.service.run_mode;
        if requested == RunMode::Interactive && !stdout_is_terminal {
            return Ok(Self {
                mode: RunMode::Daemon,
                degraded: true,
            });
        }

        Ok(Self {
            mode: requested,
            degraded: false,
        })
    }
}

/// Cancel `cancel` on SIGINT or SIGTERM
fn spawn_signal_handler(
    cancel: CancellationToken,
) -> Result<(signal_hook_tokio::Handle, JoinHandle<()>)> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|e| ServiceError::SignalError(e.to_string()))?;
    let handle = signals.handle();

    let task = tokio::spawn(async move {
        if let Some(signal) = signals.next().await {
            tracing::info!(signal, "received shutdown signal");
            cancel.cancel();
        }
    });

    Ok((handle, task))
}

/// Log snapshots until cancelled
async fn run_daemon(
    mut updates: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!("running headless");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if let Some(state) = &snapshot.state {
                    tracing::debug!(
                        label = %state.label(),
                        polls = snapshot.status.polls,
                        failures = snapshot.status.consecutive_failures,
                        "indicator state"
                    );
                }
            }
        }
    }
    Ok(())
}

/// Poll the configured source and present the level in `mode`
pub async fn run_indicator(
    config: &AppConfig,
    mode: RunMode,
    cancel: CancellationToken,
) -> Result<()> {
    let source = build_source(&config.source)?;
    let source_name = source.describe();
    let mapper = LevelMapper::new(config.tank.height_m, config.tank.bars);
    let interval = Duration::from_millis(config.service.update_interval_ms);
    tracing::info!(
        source = %source_name,
        tank_height_m = config.tank.height_m,
        bars = mapper.bars(),
        "starting indicator"
    );

    let (poller, handle, updates) = Poller::new(source, mapper, interval);
    let poller_task = tokio::spawn(poller.run(cancel.clone()));

    let result = match mode {
        RunMode::Interactive => {
            let app = App::new(mapper.bars(), source_name, interval);
            ui::run(app, config.overlay.clone(), handle, updates, cancel.clone()).await
        }
        _ => run_daemon(updates, cancel.clone()).await,
    };

    cancel.cancel();
    if let Err(e) = poller_task.await {
        tracing::error!(error = %e, "poller task failed");
    }
    result
}

/// Run the service in `mode` until shutdown
pub async fn run(config: AppConfig, mode: RunMode) -> Result<()> {
    let cancel = CancellationToken::new();
    let (signals, signal_task) = spawn_signal_handler(cancel.clone())?;

    let result = match mode {
        RunMode::Simulate => simulator::serve(&config.simulator, cancel.clone()).await,
        RunMode::Interactive | RunMode::Daemon => {
            run_indicator(&config, mode, cancel.clone()).await
        }
    };

    cancel.cancel();
    signals.close();
    if let Err(e) = signal_task.await {
        tracing::error!(error = %e, "signal handler task failed");
    }

    if let Err(e) = &result {
        tracing::error!(error = %e, "service stopped");
    } else {
        tracing::info!("service stopped");
    }
    result
}

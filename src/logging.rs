//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. The interactive overlay owns the
//! terminal, so in that mode logs go to the configured file or nowhere.

use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, RunMode};
use crate::error::{Result, ServiceError};

/// Pick the log destination for a run mode
fn make_writer(config: &LoggingConfig, mode: RunMode) -> Result<(BoxMakeWriter, bool)> {
    if let Some(path) = &config.file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        return Ok((BoxMakeWriter::new(Arc::new(file)), false));
    }

    match mode {
        RunMode::Interactive => Ok((BoxMakeWriter::new(std::io::sink), false)),
        RunMode::Daemon | RunMode::Simulate => Ok((BoxMakeWriter::new(std::io::stderr), true)),
    }
}

/// Initialise the global tracing subscriber
pub fn init(config: &LoggingConfig, mode: RunMode) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let (writer, ansi) = make_writer(config, mode)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi);

    let result = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ServiceError::InitializationError(format!("tracing init failed: {e}")))?;
    Ok(())
}

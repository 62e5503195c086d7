//! Command-line interface argument parsing.
//!
//! This module defines the CLI structure and parsing logic using clap.
//! Every flag is optional and only overrides the configuration file when given.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{RunMode, SourceKind};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Show all messages including trace
    Trace,
    /// Show debug messages and above
    Debug,
    /// Show info messages and above
    Info,
    /// Show warnings and errors only
    Warn,
    /// Show errors only
    Error,
}

impl LogLevel {
    /// Convert LogLevel to a tracing filter directive
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// tank-level: floating water tank level indicator
#[derive(Parser, Debug)]
#[command(name = "tank-level")]
#[command(version)]
#[command(about = "Polls a water tank sensor and shows the level as a bar overlay", long_about = None)]
pub struct Cli {
    /// Run mode (interactive overlay, background daemon, or sensor simulator)
    #[arg(short, long, value_enum)]
    pub mode: Option<RunMode>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Polling interval in milliseconds
    #[arg(short = 'i', long)]
    pub interval_ms: Option<u64>,

    /// Number of bars in the indicator
    #[arg(short, long)]
    pub bars: Option<u16>,

    /// Tank height in meters
    #[arg(long)]
    pub tank_height: Option<f64>,

    /// Reading source
    #[arg(short, long, value_enum)]
    pub source: Option<SourceKind>,

    /// Sensor endpoint URL (implies --source http)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Listen address for the simulator
    #[arg(long)]
    pub bind: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! Application configuration management.
//!
//! This module handles loading, parsing, and validating the application configuration.
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! `TANK_LEVEL__*` environment variables, then CLI overrides.

use clap::ValueEnum;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Environment variable prefix, e.g. `TANK_LEVEL__TANK__BARS=10`
const ENV_PREFIX: &str = "TANK_LEVEL";

/// Run mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Terminal overlay (default)
    Interactive,
    /// Background service, logs only
    Daemon,
    /// Serve the simulated tank sensor over HTTP
    Simulate,
}

/// Where readings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Rotating list of canned heights
    Simulated,
    /// Remote sensor endpoint
    Http,
}

/// Unit of the height value reported by the HTTP endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Mm,
    M,
}

impl HeightUnit {
    /// Convert a value in this unit to meters
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            HeightUnit::Mm => value / 1000.0,
            HeightUnit::M => value,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub tank: TankConfig,
    pub source: SourceConfig,
    pub overlay: OverlayConfig,
    pub logging: LoggingConfig,
    pub simulator: SimulatorConfig,
}

/// Service runtime configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub run_mode: RunMode,
    pub update_interval_ms: u64,
}

/// Tank geometry and indicator resolution
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TankConfig {
    pub height_m: f64,
    pub bars: u16,
}

/// Reading source configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub simulated_heights: Vec<f64>,
    pub http: HttpSourceConfig,
}

/// HTTP sensor endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HttpSourceConfig {
    pub url: String,
    /// JSON field holding the height
    pub field: String,
    pub unit: HeightUnit,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

/// Overlay placement and bar geometry, in terminal cells
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct OverlayConfig {
    pub margin_x: u16,
    pub margin_y: u16,
    pub bar_width: u16,
    pub bar_height: u16,
    pub bar_spacing: u16,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub json: bool,
}

/// Simulated ultrasonic tank sensor
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SimulatorConfig {
    pub bind: String,
    pub tank_height_mm: f64,
    /// Water level considered 100% full
    pub max_water_level_mm: f64,
    pub initial_distance_mm: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Interactive,
            update_interval_ms: 5000,
        }
    }
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            height_m: 2.0,
            bars: 7,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Simulated,
            simulated_heights: vec![1.5, 2.0, 1.2, 0.3, 0.1, 0.0, 2.0, 0.5],
            http: HttpSourceConfig::default(),
        }
    }
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080/height".to_string(),
            field: "water_level_mm".to_string(),
            unit: HeightUnit::Mm,
            connect_timeout_ms: 3000,
            read_timeout_ms: 3000,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            margin_x: 2,
            margin_y: 1,
            bar_width: 6,
            bar_height: 1,
            bar_spacing: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            tank_height_mm: 1200.0,
            max_water_level_mm: 950.0,
            initial_distance_mm: 250.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file plus the environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(ConfigError::from)?;

        let config: AppConfig = settings.try_deserialize().map_err(ConfigError::from)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.service.update_interval_ms == 0 {
            return Err(
                ConfigError::invalid("service.update_interval_ms", "must be greater than 0").into(),
            );
        }

        if !(self.tank.height_m.is_finite() && self.tank.height_m > 0.0) {
            return Err(ConfigError::invalid("tank.height_m", "must be a positive number").into());
        }

        if self.tank.bars == 0 {
            return Err(ConfigError::invalid("tank.bars", "must be greater than 0").into());
        }

        if self.source.kind == SourceKind::Simulated && self.source.simulated_heights.is_empty() {
            return Err(ConfigError::invalid("source.simulated_heights", "cannot be empty").into());
        }

        if self.source.kind == SourceKind::Http {
            let http = &self.source.http;
            if http.url.is_empty() {
                return Err(ConfigError::invalid("source.http.url", "cannot be empty").into());
            }
            if http.field.is_empty() {
                return Err(ConfigError::invalid("source.http.field", "cannot be empty").into());
            }
            if http.connect_timeout_ms == 0 || http.read_timeout_ms == 0 {
                return Err(
                    ConfigError::invalid("source.http", "timeouts must be greater than 0").into(),
                );
            }
        }

        if self.overlay.bar_width == 0 || self.overlay.bar_height == 0 {
            return Err(
                ConfigError::invalid("overlay", "bar width and height must be greater than 0")
                    .into(),
            );
        }

        let sim = &self.simulator;
        if !(sim.tank_height_mm > 0.0) {
            return Err(ConfigError::invalid("simulator.tank_height_mm", "must be positive").into());
        }
        if !(sim.max_water_level_mm > 0.0 && sim.max_water_level_mm <= sim.tank_height_mm) {
            return Err(ConfigError::invalid(
                "simulator.max_water_level_mm",
                "must be positive and not exceed tank_height_mm",
            )
            .into());
        }

        Ok(())
    }

    /// Apply CLI argument overrides to configuration
    pub fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(mode) = cli.mode {
            self.service.run_mode = mode;
        }

        if let Some(interval) = cli.interval_ms {
            self.service.update_interval_ms = interval;
        }

        if let Some(bars) = cli.bars {
            self.tank.bars = bars;
        }

        if let Some(height) = cli.tank_height {
            self.tank.height_m = height;
        }

        if let Some(kind) = cli.source {
            self.source.kind = kind;
        }

        if let Some(url) = &cli.url {
            self.source.http.url = url.clone();
            if cli.source.is_none() {
                self.source.kind = SourceKind::Http;
            }
        }

        if let Some(bind) = &cli.bind {
            self.simulator.bind = bind.clone();
        }

        if let Some(level) = cli.log_level {
            self.logging.level = level.to_filter_string().to_string();
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self).map_err(ConfigError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.tank.height_m, 2.0);
        assert_eq!(config.tank.bars, 7);
        assert_eq!(config.service.update_interval_ms, 5000);
        assert_eq!(config.source.kind, SourceKind::Simulated);
        assert_eq!(config.source.simulated_heights.len(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_update_interval() {
        let mut config = AppConfig::default();
        config.service.update_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_tank_height() {
        let mut config = AppConfig::default();
        config.tank.height_m = 0.0;
        assert!(config.validate().is_err());
        config.tank.height_m = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_bars() {
        let mut config = AppConfig::default();
        config.tank.bars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_simulated_heights() {
        let mut config = AppConfig::default();
        config.source.simulated_heights.clear();
        assert!(config.validate().is_err());

        // Only matters when the simulated source is selected
        config.source.kind = SourceKind::Http;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_simulator_max_level() {
        let mut config = AppConfig::default();
        config.simulator.max_water_level_mm = 1500.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_height_unit_conversion() {
        assert_eq!(HeightUnit::Mm.to_meters(950.0), 0.95);
        assert_eq!(HeightUnit::M.to_meters(1.5), 1.5);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.tank.bars, 7);
        assert_eq!(config.source.http.field, "water_level_mm");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[tank]\nbars = 10\n\n[source]\nkind = \"http\"\n\n[source.http]\nurl = \"http://tank.local/height\"\nunit = \"m\"\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.tank.bars, 10);
        assert_eq!(config.tank.height_m, 2.0);
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.http.url, "http://tank.local/height");
        assert_eq!(config.source.http.unit, HeightUnit::M);
        assert_eq!(config.source.http.read_timeout_ms, 3000);
    }

    #[test]
    fn test_load_rejects_bad_type() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[tank]\nbars = \"lots\"\n").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_toml_dump_reloads() {
        let mut config = AppConfig::default();
        config.tank.bars = 12;
        let text = config.to_toml_string().unwrap();

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let reloaded = AppConfig::load(file.path()).unwrap();
        assert_eq!(reloaded.tank.bars, 12);
        assert_eq!(reloaded.source.simulated_heights, config.source.simulated_heights);
    }

    #[test]
    fn test_cli_url_switches_to_http() {
        use clap::Parser;

        let cli = crate::cli::Cli::parse_from(["tank-level", "--url", "http://10.0.0.5/height"]);
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.http.url, "http://10.0.0.5/height");
    }

    #[test]
    fn test_cli_overrides() {
        use clap::Parser;

        let cli = crate::cli::Cli::parse_from([
            "tank-level",
            "--mode",
            "daemon",
            "--interval-ms",
            "250",
            "--bars",
            "10",
            "--tank-height",
            "1.2",
        ]);
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.service.run_mode, RunMode::Daemon);
        assert_eq!(config.service.update_interval_ms, 250);
        assert_eq!(config.tank.bars, 10);
        assert_eq!(config.tank.height_m, 1.2);
        assert_eq!(config.source.kind, SourceKind::Simulated);
    }
}

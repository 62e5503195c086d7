//! Reading sources for the poller.
//!
//! A source produces one water height per call. The simulated source cycles
//! through canned values; the HTTP source asks the tank sensor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{SourceConfig, SourceKind};
use crate::error::SourceError;

pub mod http;
pub mod simulated;

pub use http::HttpSource;
pub use simulated::SimulatedSource;

/// A single water height, in meters
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub height_m: f64,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Reading taken now
    pub fn now(height_m: f64) -> Self {
        Self {
            height_m,
            timestamp: Utc::now(),
        }
    }
}

/// Something that can be asked for the current water height
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingSource: Send {
    /// Obtain the next reading
    async fn fetch(&mut self) -> Result<Reading, SourceError>;

    /// Short human readable description, shown in the status bar
    fn describe(&self) -> String;
}

/// Build the source selected by the configuration
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn ReadingSource>, SourceError> {
    match config.kind {
        SourceKind::Simulated => Ok(Box::new(SimulatedSource::new(
            config.simulated_heights.clone(),
        )?)),
        SourceKind::Http => Ok(Box::new(HttpSource::new(&config.http)?)),
    }
}

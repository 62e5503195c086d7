//! Height to indicator level quantization.
//!
//! A reading is normalized against the tank height into a fill fraction in
//! `[0, 1]`, then quantized into one of `bars + 1` discrete levels.

use crate::error::SourceError;
use crate::sources::Reading;

/// Normalized fill of the tank, clamped to `[0, 1]`
pub fn fill_fraction(height: f64, tank_height: f64) -> f64 {
    let ratio = height / tank_height;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Number of filled bars for `height`, always within `[0, bars]`
pub fn level(height: f64, bars: u16, tank_height: f64) -> u16 {
    let scaled = (fill_fraction(height, tank_height) * f64::from(bars)).round();
    // `as` saturates at 0 for NaN and negatives
    (scaled as u16).min(bars)
}

/// Fill percentage rounded to the nearest integer, e.g. `"50"`
pub fn percent(height: f64, tank_height: f64) -> String {
    let pct = (fill_fraction(height, tank_height) * 100.0).round() as u8;
    pct.to_string()
}

/// What the indicator shows for one reading
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorState {
    pub level: u16,
    pub bars: u16,
    pub fraction: f64,
    pub percent: String,
}

impl IndicatorState {
    /// Label shown above the bars
    pub fn label(&self) -> String {
        format!("Water Level: {}%", self.percent)
    }
}

/// Maps readings onto indicator states for a fixed tank geometry
#[derive(Debug, Clone, Copy)]
pub struct LevelMapper {
    tank_height: f64,
    bars: u16,
}

impl LevelMapper {
    pub fn new(tank_height: f64, bars: u16) -> Self {
        Self { tank_height, bars }
    }

    pub fn bars(&self) -> u16 {
        self.bars
    }

    /// Map a reading, rejecting values that cannot describe a water column.
    ///
    /// Rejected readings leave the caller's previous state untouched.
    pub fn map(&self, reading: &Reading) -> Result<IndicatorState, SourceError> {
        let height = reading.height_m;
        if !height.is_finite() || height < 0.0 {
            return Err(SourceError::InvalidReading(height));
        }

        let state = IndicatorState {
            level: level(height, self.bars, self.tank_height),
            bars: self.bars,
            fraction: fill_fraction(height, self.tank_height),
            percent: percent(height, self.tank_height),
        };
        tracing::debug!(
            height_m = height,
            level = state.level,
            percent = %state.percent,
            "calculated level"
        );
        Ok(state)
    }
}

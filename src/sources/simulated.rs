use async_trait::async_trait;

use super::{Reading, ReadingSource};
use crate::error::SourceError;

/// Cycles through a fixed list of heights, one per fetch
pub struct SimulatedSource {
    heights: Vec<f64>,
    index: usize,
}

impl SimulatedSource {
    pub fn new(heights: Vec<f64>) -> Result<Self, SourceError> {
        if heights.is_empty() {
            return Err(SourceError::Config(
                "simulated source needs at least one height".to_string(),
            ));
        }
        Ok(Self { heights, index: 0 })
    }
}

#[async_trait]
impl ReadingSource for SimulatedSource {
    async fn fetch(&mut self) -> Result<Reading, SourceError> {
        let height = self.heights[self.index];
        self.index = (self.index + 1) % self.heights.len();
        tracing::debug!(height_m = height, "simulated water height");
        Ok(Reading::now(height))
    }

    fn describe(&self) -> String {
        format!("simulated ({} values)", self.heights.len())
    }
}

//! Bar stack model for the level indicator.
//!
//! Bars are indexed from the bottom; the bottom `level` bars are filled and
//! colored on a green (bottom) to red (top) gradient.

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One bar of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    /// Position counted from the bottom
    pub index: u16,
    pub filled: bool,
    pub color: Rgb,
}

/// Gradient color for bar `index` of `bars`
pub fn bar_color(index: u16, bars: u16) -> Rgb {
    let fraction = if bars > 1 {
        f64::from(index) / f64::from(bars - 1)
    } else {
        1.0
    };
    Rgb {
        r: (255.0 * fraction) as u8,
        g: (255.0 * (1.0 - fraction)) as u8,
        b: 0,
    }
}

/// Current level of an indicator with a fixed number of bars
#[derive(Debug, Clone)]
pub struct Indicator {
    bars: u16,
    level: u16,
}

impl Indicator {
    pub fn new(bars: u16) -> Self {
        Self { bars, level: 0 }
    }

    pub fn bars(&self) -> u16 {
        self.bars
    }

    pub fn level(&self) -> u16 {
        self.level
    }

    /// Set the level; values outside `[0, bars]` are ignored.
    ///
    /// Returns whether the level was accepted.
    pub fn update_level(&mut self, level: u16) -> bool {
        if level > self.bars {
            tracing::warn!(level, bars = self.bars, "ignoring out of range level");
            return false;
        }
        self.level = level;
        true
    }

    /// Bars in drawing order, top first
    pub fn bars_top_down(&self) -> Vec<Bar> {
        (0..self.bars)
            .rev()
            .map(|index| Bar {
                index,
                filled: index < self.level,
                color: bar_color(index, self.bars),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(bar_color(0, 7), Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(bar_color(6, 7), Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_gradient_midpoint_truncates() {
        // 255 * 0.5 = 127.5
        assert_eq!(bar_color(1, 3), Rgb { r: 127, g: 127, b: 0 });
    }

    #[test]
    fn test_single_bar_uses_full_fraction() {
        assert_eq!(bar_color(0, 1), Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn test_bottom_bars_filled() {
        let mut indicator = Indicator::new(7);
        assert!(indicator.update_level(3));

        let bars = indicator.bars_top_down();
        assert_eq!(bars.len(), 7);
        assert_eq!(bars[0].index, 6);
        assert_eq!(bars[6].index, 0);

        let filled: Vec<bool> = bars.iter().map(|b| b.filled).collect();
        assert_eq!(filled, vec![false, false, false, false, true, true, true]);
    }

    #[test]
    fn test_empty_and_full() {
        let mut indicator = Indicator::new(5);
        assert!(indicator.bars_top_down().iter().all(|b| !b.filled));

        indicator.update_level(5);
        assert!(indicator.bars_top_down().iter().all(|b| b.filled));
    }

    #[test]
    fn test_out_of_range_level_keeps_previous() {
        let mut indicator = Indicator::new(7);
        indicator.update_level(4);
        assert!(!indicator.update_level(8));
        assert_eq!(indicator.level(), 4);
    }
}

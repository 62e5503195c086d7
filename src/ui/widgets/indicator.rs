//! Floating level indicator anchored to the top-right corner.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::config::OverlayConfig;
use crate::indicator::Indicator;

/// Wide enough for "Water Level: 100%"
const LABEL_WIDTH: u16 = 17;

/// Size of the overlay for `bars` bars
fn overlay_size(bars: u16, overlay: &OverlayConfig) -> (u16, u16) {
    let width = LABEL_WIDTH.max(overlay.bar_width);
    let stack = bars
        .saturating_mul(overlay.bar_height)
        .saturating_add(bars.saturating_sub(1).saturating_mul(overlay.bar_spacing));
    (width, stack.saturating_add(1))
}

/// Where the overlay sits inside `screen`, clipped to it
pub fn overlay_area(screen: Rect, bars: u16, overlay: &OverlayConfig) -> Rect {
    let (width, height) = overlay_size(bars, overlay);
    let width = width.min(screen.width);
    let height = height.min(screen.height.saturating_sub(overlay.margin_y));

    let x = screen
        .right()
        .saturating_sub(width)
        .saturating_sub(overlay.margin_x)
        .max(screen.x);
    let y = screen.y.saturating_add(overlay.margin_y);

    Rect::new(x, y, width, height)
}

/// Render the label and bar stack
pub fn render_indicator(
    frame: &mut Frame,
    screen: Rect,
    indicator: &Indicator,
    label: &str,
    overlay: &OverlayConfig,
) {
    let area = overlay_area(screen, indicator.bars(), overlay);
    if area.width == 0 || area.height == 0 {
        return;
    }
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(Span::styled(
        label.to_string(),
        Style::default().fg(Color::Green),
    ))];

    let bars = indicator.bars_top_down();
    let last = bars.len().saturating_sub(1);
    for (row, bar) in bars.iter().enumerate() {
        let cell = if bar.filled {
            Span::styled(
                "█".repeat(usize::from(overlay.bar_width)),
                Style::default().fg(Color::Rgb(bar.color.r, bar.color.g, bar.color.b)),
            )
        } else {
            Span::raw(" ".repeat(usize::from(overlay.bar_width)))
        };
        for _ in 0..overlay.bar_height {
            lines.push(Line::from(cell.clone()));
        }
        if row != last {
            for _ in 0..overlay.bar_spacing {
                lines.push(Line::from(""));
            }
        }
    }

    // On a short screen drop rows from the top of the stack, keeping the
    // label and the bottom bars where the water is
    let overflow = lines.len().saturating_sub(usize::from(area.height));
    if overflow > 0 {
        let end = (1 + overflow).min(lines.len());
        lines.drain(1..end);
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Right);
    frame.render_widget(paragraph, area);
}

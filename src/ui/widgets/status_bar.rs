//! Status bar widget.

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::App;

/// Build the status line spans
pub fn status_spans(app: &App) -> Vec<Span<'static>> {
    let mut spans = vec![];

    let (text, color) = if app.is_polling {
        ("LIVE", Color::Green)
    } else {
        ("PAUSED", Color::Yellow)
    };
    spans.push(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("{}/{} bars", app.indicator.level(), app.indicator.bars()),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::raw(" │ "));
    spans.push(Span::styled(
        format!("{} every {}s", app.source_name, app.interval.as_secs_f64()),
        Style::default().fg(Color::Cyan),
    ));

    spans.push(Span::raw(" │ "));
    let updated = match app.poll_status.last_update {
        Some(ts) => format!("updated {}", ts.with_timezone(&Local).format("%H:%M:%S")),
        None => "no data yet".to_string(),
    };
    spans.push(Span::styled(updated, Style::default().fg(Color::Gray)));

    if app.poll_status.consecutive_failures > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} failed", app.poll_status.consecutive_failures),
            Style::default().fg(Color::Red),
        ));
    }

    if let Some(status) = &app.status_message {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Gray)));
    }

    spans
}

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(status_spans(app))).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn text(app: &App) -> String {
        status_spans(app)
            .iter()
            .map(|s| s.content.to_string())
            .collect()
    }

    #[test]
    fn test_initial_status() {
        let mut app = App::new(7, "simulated (8 values)".to_string(), Duration::from_secs(5));
        app.status_message = None;
        assert_eq!(
            text(&app),
            "LIVE │ 0/7 bars │ simulated (8 values) every 5s │ no data yet"
        );
    }

    #[test]
    fn test_failures_and_pause_shown() {
        let mut app = App::new(7, "http://tank/height".to_string(), Duration::from_millis(500));
        app.status_message = None;
        app.toggle_polling();
        app.poll_status.consecutive_failures = 3;

        let line = text(&app);
        assert!(line.starts_with("PAUSED"));
        assert!(line.contains("every 0.5s"));
        assert!(line.contains("3 failed"));
        assert!(line.contains("Polling paused"));
    }

    #[test]
    fn test_shows_current_level() {
        let mut app = App::new(10, "simulated (8 values)".to_string(), Duration::from_secs(5));
        app.indicator.update_level(6);
        assert!(text(&app).contains("6/10 bars"));
    }
}

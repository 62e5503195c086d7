//! Help panel widget.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, Style::default().fg(Color::Cyan)),
        Span::raw(description),
    ])
}

/// Render the help panel
pub fn render_help(frame: &mut Frame, area: Rect) {
    // Clear the area first
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("Polling", heading)),
        key_line("  Space/p", " - Pause or resume polling"),
        key_line("  r", "       - Measure now"),
        Line::from(""),
        Line::from(Span::styled("Other", heading)),
        key_line("  ?/h/F1", "  - Toggle this help"),
        key_line("  q/Esc", "   - Quit application"),
        Line::from(""),
        Line::from(Span::styled("Indicator", heading)),
        Line::from(vec![
            Span::styled("  █", Style::default().fg(Color::Green)),
            Span::raw(" - Bottom bars, tank nearly empty"),
        ]),
        Line::from(vec![
            Span::styled("  █", Style::default().fg(Color::Red)),
            Span::raw(" - Top bars, tank nearly full"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("?", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" to close this help"),
        ]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

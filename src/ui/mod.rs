//! Terminal UI module using ratatui.
//!
//! This module draws the floating tank indicator over an otherwise empty
//! alternate screen and reacts to keyboard input.

pub mod app;
pub mod input;
pub mod widgets;

pub use app::App;
pub use input::{map_event, InputAction};

use crossterm::{
    cursor,
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::OverlayConfig;
use crate::error::{Result, UiError};
use crate::poller::{PollerHandle, Snapshot};

/// Alternate-screen terminal, restored on drop
struct OverlayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl OverlayTerminal {
    fn enter() -> std::result::Result<Self, UiError> {
        enable_raw_mode().map_err(|e| UiError::InitializationError(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)
            .map_err(|e| UiError::InitializationError(e.to_string()))?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| UiError::InitializationError(e.to_string()))?;
        Ok(Self { terminal })
    }

    fn draw<F>(&mut self, render: F) -> std::result::Result<(), UiError>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal
            .draw(render)
            .map(|_| ())
            .map_err(|e| UiError::RenderError(e.to_string()))
    }
}

impl Drop for OverlayTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    }
}

/// Centered rectangle for popups
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Draw one frame
pub fn draw(frame: &mut Frame, app: &App, overlay: &OverlayConfig) {
    let [main, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(frame.area());

    widgets::render_indicator(frame, main, &app.indicator, &app.label, overlay);
    widgets::render_status_bar(frame, status, app);

    if app.show_help {
        widgets::render_help(frame, centered(main, 50, 18));
    }
}

/// Run the overlay until the user quits or `cancel` fires
pub async fn run(
    mut app: App,
    overlay: OverlayConfig,
    poller: PollerHandle,
    mut updates: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut terminal = OverlayTerminal::enter()?;
    tracing::info!("overlay attached");

    let mut events = EventStream::new();

    loop {
        terminal.draw(|frame| draw(frame, &app, &overlay))?;

        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    tracing::warn!("poller went away, closing overlay");
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                app.apply_snapshot(&snapshot);
            }
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let action = map_event(&event);
                    app.handle_action(action);
                    match action {
                        InputAction::TogglePolling => poller.set_paused(!app.is_polling),
                        InputAction::RefreshNow => poller.refresh_now(),
                        _ => {}
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "terminal input failed");
                    break;
                }
                None => break,
            },
        }

        if app.should_quit {
            tracing::info!("quit requested");
            cancel.cancel();
            break;
        }
    }

    tracing::info!("overlay detached");
    Ok(())
}

//! Application state management for the TUI.
//!
//! This module holds what the overlay shows: the indicator, its label and
//! the poller's health, plus UI toggles.

use std::time::Duration;

use crate::indicator::Indicator;
use crate::poller::{PollStatus, Snapshot};
use crate::ui::input::InputAction;

/// Label shown before the first good reading
pub const DEFAULT_LABEL: &str = "Water Level";

/// Application state
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,
    /// Whether the poller is fetching
    pub is_polling: bool,
    /// Show help panel
    pub show_help: bool,
    /// Where readings come from
    pub source_name: String,
    /// Poll interval, for the status bar
    pub interval: Duration,
    /// Bar stack
    pub indicator: Indicator,
    /// Text above the bars
    pub label: String,
    /// Latest poller health
    pub poll_status: PollStatus,
    /// Transient status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application state
    pub fn new(bars: u16, source_name: String, interval: Duration) -> Self {
        Self {
            should_quit: false,
            is_polling: true,
            show_help: false,
            source_name,
            interval,
            indicator: Indicator::new(bars),
            label: DEFAULT_LABEL.to_string(),
            poll_status: PollStatus::default(),
            status_message: Some("Application started".to_string()),
        }
    }

    /// Take over the poller's latest snapshot
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        if let Some(state) = &snapshot.state {
            if self.indicator.update_level(state.level) {
                self.label = state.label();
            }
        }
        self.poll_status = snapshot.status.clone();
    }

    /// Apply a keyboard action to local state
    pub fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::Quit => self.should_quit = true,
            InputAction::TogglePolling => self.toggle_polling(),
            InputAction::RefreshNow => self.set_status("Refresh requested".to_string()),
            InputAction::ToggleHelp => self.toggle_help(),
            InputAction::None => {}
        }
    }

    /// Toggle polling state
    pub fn toggle_polling(&mut self) {
        self.is_polling = !self.is_polling;
        self.status_message = Some(format!(
            "Polling {}",
            if self.is_polling { "resumed" } else { "paused" }
        ));
    }

    /// Toggle help panel
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

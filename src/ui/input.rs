//! Input handling for the TUI.
//!
//! This module translates terminal events into application actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions that can be performed based on user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Quit the application
    Quit,
    /// Pause or resume polling
    TogglePolling,
    /// Fetch a reading now
    RefreshNow,
    /// Toggle help panel
    ToggleHelp,
    /// No action
    None,
}

/// Map a terminal event to an application action
pub fn map_event(event: &Event) -> InputAction {
    match event {
        Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
            map_key_to_action(*key_event)
        }
        _ => InputAction::None,
    }
}

/// Map a key event to an application action
fn map_key_to_action(key_event: KeyEvent) -> InputAction {
    match key_event.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') => InputAction::Quit,
        KeyCode::Esc => InputAction::Quit,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            InputAction::Quit
        }

        // Pause / resume
        KeyCode::Char(' ') => InputAction::TogglePolling,
        KeyCode::Char('p') | KeyCode::Char('P') => InputAction::TogglePolling,

        // Measure now
        KeyCode::Char('r') | KeyCode::Char('R') => InputAction::RefreshNow,

        // Help
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            InputAction::ToggleHelp
        }

        _ => InputAction::None,
    }
}

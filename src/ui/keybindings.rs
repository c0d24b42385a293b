//! Keyboard input handling and key mappings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map digit/shifted-digit keys to panel number (1..2).
pub fn map_key_to_digit(k: &KeyEvent) -> Option<usize> {
    match k.code {
        KeyCode::Char('1' | '!') => Some(1),
        KeyCode::Char('2' | '@') => Some(2),
        _ => None,
    }
}

/// Check if the key event is a shifted symbol (!, @).
pub fn is_shifted_symbol(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('!' | '@'))
}

/// Actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    Up,
    Down,
    Enter,
    Back,
    TogglePause,
    Stop,
    NextTrack,
    PreviousTrack,
    ToggleSpectrum,
    Quit,
    TogglePanel(usize),
    None,
}

/// Convert a key event to a navigation action.
pub fn key_to_action(key: &KeyEvent) -> NavigationAction {
    if key.kind == KeyEventKind::Release {
        return NavigationAction::None;
    }

    if let Some(d) = map_key_to_digit(key) {
        if key.modifiers.contains(KeyModifiers::SHIFT) || is_shifted_symbol(key) {
            return NavigationAction::TogglePanel(d);
        }
    }

    match key.code {
        KeyCode::Down | KeyCode::Char('j') => NavigationAction::Down,
        KeyCode::Up | KeyCode::Char('k') => NavigationAction::Up,
        KeyCode::Enter | KeyCode::Right => NavigationAction::Enter,
        KeyCode::Left | KeyCode::Backspace => NavigationAction::Back,
        KeyCode::Char(' ') => NavigationAction::TogglePause,
        KeyCode::Char('s') => NavigationAction::Stop,
        KeyCode::Char('n') | KeyCode::Char('>') => NavigationAction::NextTrack,
        KeyCode::Char('p') | KeyCode::Char('<') => NavigationAction::PreviousTrack,
        KeyCode::Char('v') => NavigationAction::ToggleSpectrum,
        KeyCode::Char('q') | KeyCode::Esc => NavigationAction::Quit,
        _ => NavigationAction::None,
    }
}

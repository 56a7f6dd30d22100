//! Key bindings: normal and vim-style.

use columnstui::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// The engine command behind this action, if any. Pause and restart stay in the front-end.
    pub fn command(self) -> Option<Command> {
        match self {
            Self::MoveLeft => Some(Command::MoveLeft),
            Self::MoveRight => Some(Command::MoveRight),
            Self::Rotate => Some(Command::Rotate),
            Self::SoftDrop => Some(Command::SoftDrop),
            Self::Quit => Some(Command::Quit),
            Self::Pause | Self::Restart | Self::None => None,
        }
    }
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('<') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('>') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char(' ') => Action::Rotate,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Enter => Action::SoftDrop,
        _ => Action::None,
    }
}

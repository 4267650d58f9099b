//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    NextView,
    PrevView,
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    Refresh,
    SubmitQuery,
    Cancel,
}

pub fn map_key(event: KeyEvent) -> Option<KeyAction> {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            KeyCode::Char('r') => Some(KeyAction::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(KeyAction::Quit),
        KeyCode::Tab => Some(KeyAction::NextView),
        KeyCode::BackTab => Some(KeyAction::PrevView),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::MoveDown),
        KeyCode::Right | KeyCode::Char(']') => Some(KeyAction::NextPage),
        KeyCode::Left | KeyCode::Char('[') => Some(KeyAction::PrevPage),
        KeyCode::Char('r') => Some(KeyAction::Refresh),
        KeyCode::Char('s') | KeyCode::Enter => Some(KeyAction::SubmitQuery),
        KeyCode::Esc => Some(KeyAction::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_bindings() {
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn test_pagination_bindings() {
        assert_eq!(map_key(key(KeyCode::Char(']'))), Some(KeyAction::NextPage));
        assert_eq!(map_key(key(KeyCode::Left)), Some(KeyAction::PrevPage));
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        assert_eq!(map_key(key(KeyCode::Char('z'))), None);
    }
}

//! Key bindings: arrows and vim-style movement, Enter/Space to confirm.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Clear at cursor, pick highlighted difficulty, or continue.
    Confirm,
    /// Difficulty by menu position (0-based).
    Pick(usize),
    Retry,
    GiveUp,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, Enter) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Confirm,
        KeyCode::Char('r' | 'R') => Action::Retry,
        KeyCode::Char('g' | 'G') => Action::GiveUp,
        KeyCode::Char(c @ '1'..='9') => Action::Pick(c as usize - '1' as usize),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_pick_menu_rows() {
        assert_eq!(key_to_action(key(KeyCode::Char('1'))), Action::Pick(0));
        assert_eq!(key_to_action(key(KeyCode::Char('5'))), Action::Pick(4));
    }

    #[test]
    fn vim_and_arrows_agree() {
        assert_eq!(key_to_action(key(KeyCode::Char('h'))), key_to_action(key(KeyCode::Left)));
        assert_eq!(key_to_action(key(KeyCode::Char('j'))), key_to_action(key(KeyCode::Down)));
    }

    #[test]
    fn ctrl_c_quits_other_chords_ignored() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(ctrl('r')), Action::None);
    }
}

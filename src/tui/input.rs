use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Keep,
    Delete,
    /// Move past the current photo without deciding
    Skip,
    Previous,
    Undo,
    /// Submit queued deletes now
    Commit,
    ToggleSort,
    ToggleDeleteMode,
    /// Switch between swipe and browse layouts
    ToggleView,
    /// Review what is left again from the start
    Restart,
    /// Rescan the directory
    Reload,
    Open,
    Help,
    ApproveDelete,
    DeclineDelete,
    None,
}

/// Maps keyboard events to actions
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Quit: q or Ctrl+C
        (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        // Keep: Right arrow or k
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Keep,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Keep,

        // Delete: Left arrow, d or t
        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Delete,
        (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Delete,
        (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::Delete,

        // Navigation
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Skip,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Skip,
        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::Skip,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('i'), KeyModifiers::NONE) => KeyAction::Previous,

        // Undo: u or Ctrl+Z
        (KeyCode::Char('u'), KeyModifiers::NONE) => KeyAction::Undo,
        (KeyCode::Char('z'), KeyModifiers::CONTROL) => KeyAction::Undo,

        (KeyCode::Char('c'), KeyModifiers::NONE) => KeyAction::Commit,
        (KeyCode::Char('s'), KeyModifiers::NONE) => KeyAction::ToggleSort,
        (KeyCode::Char('m'), KeyModifiers::NONE) => KeyAction::ToggleDeleteMode,
        (KeyCode::Char('b'), KeyModifiers::NONE) => KeyAction::ToggleView,
        (KeyCode::Char('r'), KeyModifiers::NONE) => KeyAction::Restart,

        // Reload: R (terminals report shift inconsistently) or F5
        (KeyCode::Char('R'), _) => KeyAction::Reload,
        (KeyCode::F(5), _) => KeyAction::Reload,

        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,
        (KeyCode::Char('?'), _) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events while a delete is waiting for consent
pub fn handle_approval_input(key: KeyEvent) -> KeyAction {
    match (key.code, key.modifiers) {
        // Approve: y or Enter
        (KeyCode::Char('y'), _) | (KeyCode::Char('Y'), _) => KeyAction::ApproveDelete,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::ApproveDelete,

        // Decline: n or Esc
        (KeyCode::Char('n'), _) | (KeyCode::Char('N'), _) => KeyAction::DeclineDelete,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::DeclineDelete,

        _ => KeyAction::None,
    }
}

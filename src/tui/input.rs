//! Key routing: terminal key events to selector messages.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::model::SelectionMsg;

/// One row of the help bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Bindings shown in the help bar, in display order.
pub const HELP_BINDINGS: &[HelpBinding] = &[
    HelpBinding {
        keys: "↑/w/k",
        description: "up",
    },
    HelpBinding {
        keys: "↓/s/j",
        description: "down",
    },
    HelpBinding {
        keys: "enter/e/space",
        description: "select",
    },
    HelpBinding {
        keys: "r",
        description: "refresh",
    },
    HelpBinding {
        keys: "d",
        description: "delete",
    },
    HelpBinding {
        keys: "c",
        description: "clear",
    },
    HelpBinding {
        keys: "q/esc/ctrl+c",
        description: "quit",
    },
];

/// Map a key event to a message. Releases and repeats of non-movement keys
/// are dropped.
#[must_use]
pub fn resolve_key_event(key: &KeyEvent) -> Option<SelectionMsg> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(SelectionMsg::Quit),
            _ => None,
        };
    }

    let repeat = key.kind == KeyEventKind::Repeat;
    let msg = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'k') => SelectionMsg::MoveUp,
        KeyCode::Down | KeyCode::Char('s' | 'j') => SelectionMsg::MoveDown,
        _ if repeat => return None,
        KeyCode::Enter | KeyCode::Char('e' | ' ') => SelectionMsg::Activate,
        KeyCode::Char('r') => SelectionMsg::Refresh,
        KeyCode::Char('d') => SelectionMsg::Delete,
        KeyCode::Char('c') => SelectionMsg::ClearActive,
        KeyCode::Char('q') | KeyCode::Esc => SelectionMsg::Quit,
        _ => return None,
    };
    Some(msg)
}

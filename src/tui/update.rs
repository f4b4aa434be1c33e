//! Pure update function for the Elm-style selector.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! **Design invariant:** this module performs zero I/O. All effects are
//! described as [`SelectionCmd`] values.

use super::model::{SelectionCmd, SelectionModel, SelectionMsg};
use crate::scanner::ranking::ranked;

/// Commands to run once, before the first message.
#[must_use]
pub fn init() -> SelectionCmd {
    SelectionCmd::Batch(vec![SelectionCmd::Scan, SelectionCmd::ReadActive])
}

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut SelectionModel, msg: SelectionMsg) -> SelectionCmd {
    if model.quit {
        return SelectionCmd::None;
    }

    match msg {
        SelectionMsg::ScanCompleted { at, result } => {
            match result {
                Ok(entries) => {
                    model.entries = ranked(entries, at);
                    model.ranked_at = Some(at);
                    model.scan_error = None;
                    clamp_cursor(model);
                }
                Err(failure) => model.scan_error = Some(failure),
            }
            SelectionCmd::None
        }

        SelectionMsg::ActiveResolved(name) => {
            model.active = name;
            SelectionCmd::None
        }

        SelectionMsg::Quit => {
            model.quit = true;
            SelectionCmd::Quit
        }

        SelectionMsg::Error(err) => {
            model.action_error = Some(err);
            SelectionCmd::None
        }

        // Once an activation is under way only Quit and effect results apply.
        _ if model.activating.is_some() => SelectionCmd::None,

        SelectionMsg::MoveUp => {
            if model.list_usable() && model.cursor > 0 {
                model.cursor -= 1;
            }
            SelectionCmd::None
        }

        SelectionMsg::MoveDown => {
            if model.list_usable() && model.cursor + 1 < model.entries.len() {
                model.cursor += 1;
            }
            SelectionCmd::None
        }

        SelectionMsg::Refresh => SelectionCmd::Scan,

        SelectionMsg::Activate => {
            let Some(entry) = model.selected_entry().cloned() else {
                return SelectionCmd::None;
            };
            model.action_error = None;
            model.activating = Some(entry.clone());
            SelectionCmd::Sequence(vec![
                SelectionCmd::ClearActive,
                SelectionCmd::SetActive(entry),
                SelectionCmd::ReadActive,
                SelectionCmd::Quit,
            ])
        }

        SelectionMsg::Delete => {
            let Some(entry) = model.selected_entry().cloned() else {
                return SelectionCmd::None;
            };
            model.action_error = None;
            let mut steps = Vec::with_capacity(4);
            if model.is_active(&entry) {
                steps.push(SelectionCmd::ClearActive);
                steps.push(SelectionCmd::ReadActive);
            }
            steps.push(SelectionCmd::DeleteFile(entry));
            steps.push(SelectionCmd::Scan);
            SelectionCmd::Sequence(steps)
        }

        SelectionMsg::ClearActive => {
            if model.active.is_empty() {
                return SelectionCmd::None;
            }
            model.action_error = None;
            SelectionCmd::Sequence(vec![SelectionCmd::ClearActive, SelectionCmd::ReadActive])
        }
    }
}

/// Keep the cursor inside `[0, len-1]`, or at 0 for an empty list.
fn clamp_cursor(model: &mut SelectionModel) {
    if model.entries.is_empty() {
        model.cursor = 0;
    } else if model.cursor >= model.entries.len() {
        model.cursor = model.entries.len() - 1;
    }
}

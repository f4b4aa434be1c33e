//! Elm-style state model for the interactive selector.
//!
//! All display state lives in [`SelectionModel`]. Input events and effect
//! results arrive as [`SelectionMsg`] values; side-effects are represented as
//! [`SelectionCmd`] values returned from the update function.
//!
//! **Design invariant:** the model is deterministic and testable. No I/O
//! happens here.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::core::errors::KcmError;
use crate::scanner::entry::Entry;

// ──────────────────── errors ────────────────────

/// Why the last scan produced no entry list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub message: String,
    /// False when rescanning unchanged input fails the same way, e.g. a file
    /// name that does not match its pattern.
    pub retryable: bool,
}

impl ScanFailure {
    #[must_use]
    pub fn new(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            message: message.into(),
            retryable,
        }
    }
}

impl From<&KcmError> for ScanFailure {
    fn from(err: &KcmError) -> Self {
        Self::new(err.to_string(), err.is_retryable())
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// A failed mutating effect, surfaced on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// Effect that failed (e.g. "delete", "activate").
    pub action: &'static str,
    /// File the effect operated on.
    pub path: PathBuf,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.action, self.path.display(), self.message)
    }
}

// ──────────────────── outcome ────────────────────

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The selected entry is now behind the pointer.
    Activated { name: String, path: PathBuf },
    /// An activation was attempted but the pointer does not name the entry.
    ActivationFailed { name: String, message: String },
    /// The user left without activating anything.
    Quit,
}

// ──────────────────── model ────────────────────

/// Complete state of the selector.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    /// Ranked entries from the most recent successful scan.
    pub entries: Vec<Entry>,
    /// Index into `entries`; 0 when the list is empty.
    pub cursor: usize,
    /// Base name the pointer resolved to, empty when nothing is active.
    pub active: String,
    /// Last scan failure. While set the list is hidden and not navigable.
    pub scan_error: Option<ScanFailure>,
    /// Last failed mutation, shown on the status line.
    pub action_error: Option<ActionError>,
    /// Instant the current entries were ranked against.
    pub ranked_at: Option<DateTime<Utc>>,
    /// Entry an activation sequence is in flight for.
    pub activating: Option<Entry>,
    /// Set once the session should end; every later message is ignored.
    pub quit: bool,
}

impl SelectionModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry under the cursor, if the list is usable and non-empty.
    #[must_use]
    pub fn selected_entry(&self) -> Option<&Entry> {
        if self.list_usable() {
            self.entries.get(self.cursor)
        } else {
            None
        }
    }

    /// Whether `entry` is the one the pointer currently names.
    #[must_use]
    pub fn is_active(&self, entry: &Entry) -> bool {
        !self.active.is_empty() && self.active == entry.name
    }

    /// The list is usable when no scan error is recorded.
    #[must_use]
    pub fn list_usable(&self) -> bool {
        self.scan_error.is_none()
    }

    /// Whether `entry` is expired relative to the last ranking instant.
    #[must_use]
    pub fn is_expired(&self, entry: &Entry) -> bool {
        self.ranked_at.is_some_and(|at| entry.is_expired(at))
    }

    /// Summarize how the session ended.
    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        let Some(entry) = &self.activating else {
            return SessionOutcome::Quit;
        };
        if self.active == entry.name {
            SessionOutcome::Activated {
                name: entry.name.clone(),
                path: entry.path(),
            }
        } else {
            SessionOutcome::ActivationFailed {
                name: entry.name.clone(),
                message: self
                    .action_error
                    .as_ref()
                    .map_or_else(|| "pointer was not updated".to_string(), ToString::to_string),
            }
        }
    }
}

// ──────────────────── messages ────────────────────

/// Every event the state machine understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMsg {
    /// A scan finished. `at` is the instant used for ranking.
    ScanCompleted {
        at: DateTime<Utc>,
        result: Result<Vec<Entry>, ScanFailure>,
    },
    /// The pointer was read; empty means nothing is active.
    ActiveResolved(String),
    MoveUp,
    MoveDown,
    /// Activate the entry under the cursor.
    Activate,
    Refresh,
    /// Delete the file under the cursor.
    Delete,
    /// Remove the pointer.
    ClearActive,
    Quit,
    /// A mutating effect failed.
    Error(ActionError),
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the update function for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCmd {
    /// No side-effect.
    None,
    /// Scan all watch specs and deliver `ScanCompleted`.
    Scan,
    /// Read the pointer and deliver `ActiveResolved`.
    ReadActive,
    /// Remove the pointer.
    ClearActive,
    /// Point the pointer at the entry; failure delivers `Error`.
    SetActive(Entry),
    /// Remove the entry's file; failure delivers `Error`.
    DeleteFile(Entry),
    /// Run children strictly in order within one unit of work.
    Sequence(Vec<Self>),
    /// Run children as independent units of work, in any order.
    Batch(Vec<Self>),
    /// Terminate the event loop.
    Quit,
}

// ──────────────────── tests ────────────────────

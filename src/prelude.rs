//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use kubeconfig_manager::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, WatchSpec};
pub use crate::core::errors::{KcmError, Result};

// Scanner
pub use crate::scanner::entry::{Entry, is_expired};
pub use crate::scanner::ranking::{rank, ranked};
pub use crate::scanner::walker::EntryScanner;

// Pointer
pub use crate::pointer::ActivePointer;

// Logging
pub use crate::logger::ActivityLog;

// Selector
#[cfg(feature = "tui")]
pub use crate::tui::model::{SelectionCmd, SelectionModel, SelectionMsg, SessionOutcome};
#[cfg(feature = "tui")]
pub use crate::tui::update::{init, update};

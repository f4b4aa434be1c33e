//! Activity logging: JSONL append-only log shared across worker threads.

pub mod jsonl;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::config::LoggingConfig;
use jsonl::{JsonlConfig, JsonlWriter, LogEntry};

/// Cloneable handle to the activity log. A disabled handle drops every entry.
#[derive(Clone, Default)]
pub struct ActivityLog {
    inner: Option<Arc<Mutex<JsonlWriter>>>,
}

impl ActivityLog {
    /// Open the log described by `config`, or a disabled handle.
    #[must_use]
    pub fn open(config: &LoggingConfig) -> Self {
        Self::open_with(config, true)
    }

    /// Like [`ActivityLog::open`], but an unusable file drops entries instead
    /// of printing them. For use while a full-screen UI owns the terminal.
    #[must_use]
    pub fn open_quiet(config: &LoggingConfig) -> Self {
        Self::open_with(config, false)
    }

    fn open_with(config: &LoggingConfig, stderr_fallback: bool) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let writer = JsonlWriter::open(JsonlConfig {
            stderr_fallback,
            ..JsonlConfig::from_logging(config)
        });
        Self {
            inner: Some(Arc::new(Mutex::new(writer))),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn record(&self, entry: &LogEntry) {
        if let Some(writer) = &self.inner {
            writer.lock().write_entry(entry);
        }
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

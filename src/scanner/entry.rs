//! Discovered kubeconfig entries and the expiration policy applied to them.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Minutes after an entry's timestamp during which it counts as fresh.
///
/// Applied to every entry with a non-zero lifespan. The configured
/// `lifespan_minutes` is carried for display only.
pub const EXPIRY_WINDOW_MINUTES: i64 = 150;

/// [`EXPIRY_WINDOW_MINUTES`] as a chrono delta.
#[must_use]
pub fn expiry_window() -> TimeDelta {
    TimeDelta::minutes(EXPIRY_WINDOW_MINUTES)
}

/// One candidate kubeconfig file, captured at scan time.
///
/// Entries are value snapshots: they go stale when the directory changes and
/// are replaced wholesale by the next scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// File base name; compared against the active pointer's target name.
    pub name: String,
    /// Directory containing the file.
    pub dir: PathBuf,
    /// Creation time parsed from the name, `None` when no pattern is configured.
    pub timestamp: Option<DateTime<Utc>>,
    /// Configured validity in minutes; 0 opts out of expiry.
    pub lifespan_minutes: u32,
}

impl Entry {
    /// Full path to the backing file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    /// Whether the entry is past its validity window at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self, now)
    }

    /// Configured lifespan, `None` for entries that never expire.
    #[must_use]
    pub fn valid_for(&self) -> Option<Duration> {
        (self.lifespan_minutes != 0)
            .then(|| Duration::from_secs(u64::from(self.lifespan_minutes) * 60))
    }
}

/// Expiration policy.
///
/// - lifespan 0 never expires
/// - no timestamp never expires
/// - otherwise expired strictly after `timestamp + expiry_window()`
#[must_use]
pub fn is_expired(entry: &Entry, now: DateTime<Utc>) -> bool {
    if entry.lifespan_minutes == 0 {
        return false;
    }
    let Some(ts) = entry.timestamp else {
        return false;
    };
    ts.checked_add_signed(expiry_window())
        .is_some_and(|deadline| now > deadline)
}

/// Human-readable duration in the `2h30m` style used for "valid for".
#[must_use]
pub fn format_lifespan(valid_for: Option<Duration>) -> String {
    let Some(d) = valid_for else {
        return "never expires".to_string();
    };
    let mins = d.as_secs() / 60;
    match (mins / 60, mins % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

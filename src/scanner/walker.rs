//! Entry scanner: lists watched directories and turns matching files into
//! [`Entry`] snapshots.
//!
//! A scan is all-or-nothing. An unreadable directory or a file name that
//! passes the suffix filter but not the timestamp pattern fails the whole
//! scan; no partial entry list is returned.

#![allow(missing_docs)]

use std::fs;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::config::{Config, WatchSpec};
use crate::core::errors::{KcmError, Result};
use crate::scanner::entry::Entry;

/// Scanner over a fixed list of watch specs.
#[derive(Debug, Clone, Default)]
pub struct EntryScanner {
    specs: Vec<WatchSpec>,
}

impl EntryScanner {
    #[must_use]
    pub fn new(specs: Vec<WatchSpec>) -> Self {
        Self { specs }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.watch.clone())
    }

    /// Scan every spec in order and concatenate the results.
    ///
    /// The output is in scan order (spec order, then file name order within a
    /// directory); ranking happens later.
    pub fn scan(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for spec in &self.specs {
            entries.extend(scan_spec(spec)?);
        }
        Ok(entries)
    }
}

fn scan_spec(spec: &WatchSpec) -> Result<Vec<Entry>> {
    let dir = &spec.dir;
    let read = fs::read_dir(dir).map_err(|source| KcmError::io(dir, source))?;

    let mut names = Vec::new();
    for item in read {
        let item = item.map_err(|source| KcmError::io(dir, source))?;
        let file_type = item
            .file_type()
            .map_err(|source| KcmError::io(item.path(), source))?;
        if file_type.is_dir() {
            continue;
        }
        // Non UTF-8 names can never match a textual suffix.
        let Ok(name) = item.file_name().into_string() else {
            continue;
        };
        if name.ends_with(&spec.suffix) {
            names.push(name);
        }
    }
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let timestamp = match &spec.pattern {
                Some(pattern) => Some(parse_timestamp(&name, pattern)?),
                None => None,
            };
            Ok(Entry {
                name,
                dir: dir.clone(),
                timestamp,
                lifespan_minutes: spec.lifespan_minutes,
            })
        })
        .collect()
}

/// Parse a file name against a chrono format pattern, as UTC.
///
/// Patterns with only date fields resolve to midnight.
pub fn parse_timestamp(name: &str, pattern: &str) -> Result<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(name, pattern) {
        Ok(naive) => Ok(naive.and_utc()),
        Err(full_err) => NaiveDate::parse_from_str(name, pattern)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| KcmError::TimestampMismatch {
                name: name.to_string(),
                pattern: pattern.to_string(),
                details: full_err.to_string(),
            }),
    }
}

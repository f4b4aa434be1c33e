//! Non-interactive listing of the ranked entry set.

#![allow(missing_docs)]

use std::path::Path;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::core::errors::Result;
use crate::pointer::ActivePointer;
use crate::scanner::entry::{Entry, format_lifespan};
use crate::scanner::ranking::ranked;
use crate::scanner::walker::EntryScanner;

const HEADERS: [&str; 5] = ["Active", "Path", "Expired", "Created At", "Valid For"];

/// One row of `kcm list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub active: bool,
    pub name: String,
    pub path: String,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// `None` for entries that never expire.
    pub valid_for_minutes: Option<u32>,
    pub valid_for: String,
}

impl ListingRow {
    fn from_entry(entry: &Entry, active: &str, now: DateTime<Utc>) -> Self {
        Self {
            active: !active.is_empty() && entry.name == active,
            name: entry.name.clone(),
            path: entry.path().display().to_string(),
            expired: entry.is_expired(now),
            created_at: entry.timestamp,
            valid_for_minutes: (entry.lifespan_minutes != 0).then_some(entry.lifespan_minutes),
            valid_for: format_lifespan(entry.valid_for()),
        }
    }

    fn cells(&self) -> [String; 5] {
        [
            if self.active { "*" } else { "" }.to_string(),
            self.path.clone(),
            if self.expired { "yes" } else { "no" }.to_string(),
            self.created_at.map_or_else(
                || "-".to_string(),
                |ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ),
            self.valid_for.clone(),
        ]
    }
}

/// Scan, rank at `now` and annotate with the pointer's current target.
pub fn collect_rows(
    scanner: &EntryScanner,
    pointer: &ActivePointer,
    now: DateTime<Utc>,
) -> Result<Vec<ListingRow>> {
    let entries = ranked(scanner.scan()?, now);
    let active = pointer.read_active();
    Ok(entries
        .iter()
        .map(|e| ListingRow::from_entry(e, &active, now))
        .collect())
}

/// Render rows as an aligned table. Colors follow `colored`'s global override.
#[must_use]
pub fn render_table(rows: &[ListingRow]) -> String {
    let cells: Vec<[String; 5]> = rows.iter().map(ListingRow::cells).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    for (row, cell_row) in rows.iter().zip(&cells) {
        let padded: Vec<String> = cell_row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(col, (cell, w))| {
                let text = format!("{cell:<w$}");
                match col {
                    0 if row.active => text.green().bold().to_string(),
                    2 if row.expired => text.red().to_string(),
                    _ => text,
                }
            })
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Message printed when nothing matched.
#[must_use]
pub fn empty_message(dirs: &[&Path]) -> String {
    let joined: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    format!("No kubeconfigs found in {}.", joined.join(", "))
}

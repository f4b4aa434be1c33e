//! Ordering policy for scanned entries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::entry::Entry;

/// Sort entries in place: fresh before expired, newest first within a bucket.
///
/// `sort_by` is stable, so entries with equal keys keep their scan order.
/// Entries without a timestamp compare as the oldest possible time.
pub fn rank(entries: &mut [Entry], now: DateTime<Utc>) {
    entries.sort_by(|a, b| compare(a, b, now));
}

/// Owned variant of [`rank`].
#[must_use]
pub fn ranked(mut entries: Vec<Entry>, now: DateTime<Utc>) -> Vec<Entry> {
    rank(&mut entries, now);
    entries
}

fn compare(a: &Entry, b: &Entry, now: DateTime<Utc>) -> Ordering {
    a.is_expired(now)
        .cmp(&b.is_expired(now))
        .then_with(|| b.timestamp.cmp(&a.timestamp))
}

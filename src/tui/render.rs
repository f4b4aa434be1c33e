//! Frame construction and terminal drawing.
//!
//! [`build_frame`] turns the model into styled lines without touching the
//! terminal, so layout is testable. [`draw`] writes a frame with crossterm.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::ops::Range;

use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use super::input::HELP_BINDINGS;
use super::model::SelectionModel;

pub const HEADER: &str = "Select a cluster.";

/// Visual role of a span; mapped to a color at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Title,
    Cursor,
    Active,
    Expired,
    Error,
    Muted,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Self::Plain => None,
            Self::Title | Self::Cursor => Some(Color::Cyan),
            Self::Active => Some(Color::Green),
            Self::Expired | Self::Error => Some(Color::Red),
            Self::Muted => Some(Color::DarkGrey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

impl Span {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

pub type Line = Vec<Span>;

/// Plain text of a line, for tests and non-color output.
#[must_use]
pub fn line_text(line: &[Span]) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}

/// Rows taken by everything except the entry list.
const CHROME_ROWS: usize = 5;

/// Build the frame for a terminal `rows` tall.
#[must_use]
pub fn build_frame(model: &SelectionModel, rows: usize) -> Vec<Line> {
    let mut lines = vec![vec![Span::new(HEADER, Tone::Title)], Vec::new()];

    if let Some(failure) = &model.scan_error {
        lines.push(vec![Span::new(format!("Error: {failure}"), Tone::Error)]);
        let hint = if failure.retryable {
            "press r to retry"
        } else {
            "rename the file or fix the watch pattern, then press r"
        };
        lines.push(vec![Span::new(hint, Tone::Muted)]);
    } else if model.entries.is_empty() {
        lines.push(vec![Span::new("No kubeconfigs found.", Tone::Muted)]);
    } else {
        let capacity = rows.saturating_sub(CHROME_ROWS).max(1);
        for idx in visible_window(model.entries.len(), model.cursor, capacity) {
            let entry = &model.entries[idx];
            let mut line = Vec::with_capacity(4);
            if idx == model.cursor {
                line.push(Span::new("> ", Tone::Cursor));
            } else {
                line.push(Span::new("  ", Tone::Plain));
            }
            line.push(Span::new("[", Tone::Plain));
            if model.is_active(entry) {
                line.push(Span::new("x", Tone::Active));
            } else {
                line.push(Span::new(" ", Tone::Plain));
            }
            line.push(Span::new("] ", Tone::Plain));
            if model.is_expired(entry) {
                line.push(Span::new("[EXPIRED] ", Tone::Expired));
            }
            line.push(Span::new(entry.name.clone(), Tone::Plain));
            lines.push(line);
        }
    }

    lines.push(Vec::new());
    if let Some(err) = &model.action_error {
        lines.push(vec![Span::new(err.to_string(), Tone::Error)]);
    }
    lines.push(help_line());
    lines
}

fn help_line() -> Line {
    let text = HELP_BINDINGS
        .iter()
        .map(|b| format!("{} {}", b.keys, b.description))
        .collect::<Vec<_>>()
        .join(" • ");
    vec![Span::new(text, Tone::Muted)]
}

/// Indices to show so that `cursor` stays on screen.
#[must_use]
pub fn visible_window(len: usize, cursor: usize, capacity: usize) -> Range<usize> {
    if len <= capacity {
        return 0..len;
    }
    let start = cursor.saturating_sub(capacity - 1).min(len - capacity);
    start..start + capacity
}

/// Write a frame to the terminal, clipped to `rows`.
pub fn draw<W: Write>(out: &mut W, frame: &[Line], rows: u16, color: bool) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in (0..rows).zip(frame) {
        queue!(out, MoveTo(0, row))?;
        for span in line {
            match span.tone.color().filter(|_| color) {
                Some(c) => {
                    queue!(out, SetForegroundColor(c))?;
                    write!(out, "{}", span.text)?;
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
                None => write!(out, "{}", span.text)?,
            }
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::scanner::entry::Entry;
    use crate::tui::model::{ActionError, ScanFailure, SelectionMsg};

    fn entry(name: &str, h: u32) -> Entry {
        Entry {
            name: name.to_string(),
            dir: PathBuf::from("/d"),
            timestamp: Some(Utc.with_ymd_and_hms(2026, 6, 1, h, 0, 0).unwrap()),
            lifespan_minutes: 150,
        }
    }

    fn model_with(names: &[(&str, u32)]) -> SelectionModel {
        SelectionModel {
            entries: names.iter().map(|(n, h)| entry(n, *h)).collect(),
            ranked_at: Some(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()),
            ..SelectionModel::default()
        }
    }

    fn texts(frame: &[Line]) -> Vec<String> {
        frame.iter().map(|l| line_text(l)).collect()
    }

    #[test]
    fn header_first() {
        let frame = build_frame(&SelectionModel::new(), 24);
        assert_eq!(line_text(&frame[0]), HEADER);
    }

    #[test]
    fn entry_lines_mark_cursor_active_and_expired() {
        let mut model = model_with(&[("fresh", 11), ("old", 8)]);
        model.active = "old".into();
        let lines = texts(&build_frame(&model, 24));
        assert!(lines.contains(&"> [ ] fresh".to_string()));
        assert!(lines.contains(&"  [x] [EXPIRED] old".to_string()));
    }

    #[test]
    fn expired_marker_follows_latest_scan() {
        let mut model = model_with(&[("fresh", 11)]);
        let entries = model.entries.clone();
        assert!(texts(&build_frame(&model, 24)).contains(&"> [ ] fresh".to_string()));

        // 11:00 plus 150 minutes closes at 13:30.
        crate::tui::update::update(
            &mut model,
            SelectionMsg::ScanCompleted {
                at: Utc.with_ymd_and_hms(2026, 6, 1, 13, 31, 0).unwrap(),
                result: Ok(entries),
            },
        );
        let lines = texts(&build_frame(&model, 24));
        assert!(lines.contains(&"> [ ] [EXPIRED] fresh".to_string()));
    }

    #[test]
    fn active_marker_is_green() {
        let mut model = model_with(&[("a", 11)]);
        model.active = "a".into();
        let frame = build_frame(&model, 24);
        let span = frame[2].iter().find(|s| s.text == "x").unwrap();
        assert_eq!(span.tone, Tone::Active);
    }

    #[test]
    fn scan_error_replaces_list() {
        let mut model = model_with(&[("a", 11)]);
        model.scan_error = Some(ScanFailure::new("open /nope: not found", true));
        let lines = texts(&build_frame(&model, 24));
        assert!(lines.iter().any(|l| l.contains("open /nope")));
        assert!(lines.contains(&"press r to retry".to_string()));
        assert!(!lines.iter().any(|l| l.ends_with(" a")));
    }

    #[test]
    fn permanent_scan_error_asks_for_a_fix() {
        let mut model = model_with(&[("a", 11)]);
        model.scan_error = Some(ScanFailure::new("bad name", false));
        let lines = texts(&build_frame(&model, 24));
        assert!(lines.iter().any(|l| l.starts_with("rename the file")));
        assert!(!lines.contains(&"press r to retry".to_string()));
    }

    #[test]
    fn action_error_on_status_line() {
        let mut model = model_with(&[("a", 11)]);
        model.action_error = Some(ActionError {
            action: "delete",
            path: PathBuf::from("/d/a"),
            message: "permission denied".into(),
        });
        let lines = texts(&build_frame(&model, 24));
        assert!(lines.iter().any(|l| l == "delete /d/a: permission denied"));
        assert!(lines.iter().any(|l| l.starts_with("> [ ] a")));
    }

    #[test]
    fn empty_list_message() {
        let lines = texts(&build_frame(&SelectionModel::new(), 24));
        assert!(lines.contains(&"No kubeconfigs found.".to_string()));
    }

    #[test]
    fn help_bar_last() {
        let lines = texts(&build_frame(&SelectionModel::new(), 24));
        assert!(lines.last().unwrap().contains("q/esc/ctrl+c quit"));
    }

    #[test]
    fn window_follows_cursor() {
        assert_eq!(visible_window(3, 0, 10), 0..3);
        assert_eq!(visible_window(10, 0, 4), 0..4);
        assert_eq!(visible_window(10, 5, 4), 2..6);
        assert_eq!(visible_window(10, 9, 4), 6..10);
    }

    #[test]
    fn long_list_keeps_cursor_visible() {
        let names: Vec<(String, u32)> = (0..30).map(|i| (format!("e{i:02}"), 11)).collect();
        let refs: Vec<(&str, u32)> = names.iter().map(|(n, h)| (n.as_str(), *h)).collect();
        let mut model = model_with(&refs);
        model.cursor = 29;
        let lines = texts(&build_frame(&model, 10));
        assert!(lines.iter().any(|l| l == "> [ ] e29"));
        assert!(!lines.iter().any(|l| l.ends_with("e00")));
    }

    #[test]
    fn draw_without_color_writes_plain_text() {
        let frame = build_frame(&model_with(&[("a", 11)]), 24);
        let mut buf = Vec::new();
        draw(&mut buf, &frame, 24, false).unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("> [ ] a"));
        assert!(out.contains(HEADER));
    }
}

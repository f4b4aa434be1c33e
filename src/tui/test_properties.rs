//! Property-based tests for selection reducer invariants.
//!
//! Uses `proptest` to verify that arbitrary sequences of selection messages
//! keep the cursor in range, never leave the quit state, and never emit
//! mutating commands that target entries outside the current list.

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use super::model::{ActionError, ScanFailure, SelectionCmd, SelectionModel, SelectionMsg};
use super::update;
use crate::scanner::entry::Entry;

// ──────────────────── strategies ────────────────────

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
}

fn arb_entry() -> impl Strategy<Value = Entry> {
    (0u32..1000, prop::option::of(-600i64..600), prop_oneof![Just(0u32), Just(150u32)])
        .prop_map(|(id, offset, lifespan)| Entry {
            name: format!("cluster-{id}.kubeconfig.txt"),
            dir: PathBuf::from("/downloads"),
            timestamp: offset.map(|m| base_time() + TimeDelta::minutes(m)),
            lifespan_minutes: lifespan,
        })
}

fn arb_scan() -> impl Strategy<Value = SelectionMsg> {
    (
        prop::result::maybe_ok(
            prop::collection::vec(arb_entry(), 0..8),
            any::<bool>().prop_map(|retryable| ScanFailure::new("scan failed", retryable)),
        ),
        0i64..300,
    )
        .prop_map(|(result, offset)| SelectionMsg::ScanCompleted {
            at: base_time() + TimeDelta::minutes(offset),
            result,
        })
}

fn scanned(entries: Vec<Entry>) -> SelectionMsg {
    SelectionMsg::ScanCompleted {
        at: base_time(),
        result: Ok(entries),
    }
}

fn arb_msg() -> impl Strategy<Value = SelectionMsg> {
    prop_oneof![
        3 => arb_scan(),
        1 => prop_oneof![
            Just(String::new()),
            (0u32..1000).prop_map(|id| format!("cluster-{id}.kubeconfig.txt")),
        ]
        .prop_map(SelectionMsg::ActiveResolved),
        4 => Just(SelectionMsg::MoveUp),
        4 => Just(SelectionMsg::MoveDown),
        1 => Just(SelectionMsg::Activate),
        1 => Just(SelectionMsg::Refresh),
        1 => Just(SelectionMsg::Delete),
        1 => Just(SelectionMsg::ClearActive),
        1 => Just(SelectionMsg::Quit),
        1 => Just(SelectionMsg::Error(ActionError {
            action: "delete",
            path: PathBuf::from("/downloads/x"),
            message: "denied".into(),
        })),
    ]
}

// ──────────────────── invariants ────────────────────

fn assert_model_invariants(model: &SelectionModel) {
    if model.entries.is_empty() {
        assert_eq!(model.cursor, 0, "cursor non-zero with empty list");
    } else {
        assert!(
            model.cursor < model.entries.len(),
            "cursor {} out of range for {} entries",
            model.cursor,
            model.entries.len()
        );
    }

    if let Some(at) = model.ranked_at {
        let first_expired = model
            .entries
            .iter()
            .position(|e| e.is_expired(at))
            .unwrap_or(model.entries.len());
        assert!(
            model.entries[first_expired..].iter().all(|e| e.is_expired(at)),
            "fresh entry ranked after an expired one"
        );
    }
}

/// Every entry a command mutates must be in the list the model showed.
fn assert_targets_known(cmd: &SelectionCmd, entries: &[Entry]) {
    match cmd {
        SelectionCmd::SetActive(e) | SelectionCmd::DeleteFile(e) => {
            assert!(entries.contains(e), "command targets unknown entry {}", e.name);
        }
        SelectionCmd::Sequence(children) | SelectionCmd::Batch(children) => {
            for child in children {
                assert_targets_known(child, entries);
            }
        }
        _ => {}
    }
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any sequence of messages preserves the model invariants.
    #[test]
    fn reducer_preserves_invariants(
        msgs in prop::collection::vec(arb_msg(), 1..60)
    ) {
        let mut model = SelectionModel::new();
        for msg in msgs {
            let before = model.entries.clone();
            let cmd = update::update(&mut model, msg);
            assert_targets_known(&cmd, &before);
            assert_model_invariants(&model);
        }
    }

    /// The quit flag only transitions from false to true, and nothing is
    /// emitted afterwards.
    #[test]
    fn quit_absorbs_everything(
        msgs in prop::collection::vec(arb_msg(), 1..40)
    ) {
        let mut model = SelectionModel::new();
        let mut ever_quit = false;
        for msg in msgs {
            let cmd = update::update(&mut model, msg);
            if ever_quit {
                prop_assert!(model.quit, "quit flag reverted");
                prop_assert_eq!(cmd, SelectionCmd::None);
            }
            ever_quit |= model.quit;
        }
    }

    /// A successful scan always lands the cursor inside the new list.
    #[test]
    fn scan_clamps_cursor(
        first in prop::collection::vec(arb_entry(), 1..10),
        second in prop::collection::vec(arb_entry(), 0..10),
        moves in 0usize..12,
    ) {
        let mut model = SelectionModel::new();
        update::update(&mut model, scanned(first));
        for _ in 0..moves {
            update::update(&mut model, SelectionMsg::MoveDown);
        }
        let len = second.len();
        update::update(&mut model, scanned(second));
        if len == 0 {
            prop_assert_eq!(model.cursor, 0);
        } else {
            prop_assert!(model.cursor < len);
        }
    }

    /// A failed scan never alters the entry list or cursor.
    #[test]
    fn scan_error_preserves_list(
        entries in prop::collection::vec(arb_entry(), 0..10),
        moves in 0usize..5,
    ) {
        let mut model = SelectionModel::new();
        update::update(&mut model, scanned(entries));
        for _ in 0..moves {
            update::update(&mut model, SelectionMsg::MoveDown);
        }
        let snapshot = (model.entries.clone(), model.cursor);
        update::update(
            &mut model,
            SelectionMsg::ScanCompleted {
                at: base_time(),
                result: Err(ScanFailure::new("gone", true)),
            },
        );
        prop_assert_eq!((model.entries.clone(), model.cursor), snapshot);
        prop_assert!(!model.list_usable());
    }

    /// Activating always clears before setting and finishes by quitting.
    #[test]
    fn activation_sequence_shape(
        entries in prop::collection::vec(arb_entry(), 1..8),
        moves in 0usize..8,
    ) {
        let mut model = SelectionModel::new();
        update::update(&mut model, scanned(entries));
        for _ in 0..moves {
            update::update(&mut model, SelectionMsg::MoveDown);
        }
        let selected = model.entries[model.cursor].clone();
        let cmd = update::update(&mut model, SelectionMsg::Activate);
        prop_assert_eq!(
            cmd,
            SelectionCmd::Sequence(vec![
                SelectionCmd::ClearActive,
                SelectionCmd::SetActive(selected),
                SelectionCmd::ReadActive,
                SelectionCmd::Quit,
            ])
        );
    }
}

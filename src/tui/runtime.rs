//! Event loop that drives the selection model.
//!
//! One ordered inbox (a crossbeam channel) carries user input and effect
//! results. Commands returned by `update` are interpreted here:
//!
//! - `Batch` children become independent units of work on their own threads.
//! - `Sequence` children run in order inside one unit; each step's message is
//!   in the inbox before the next step starts.
//! - User input that arrives while any unit is in flight is deferred until
//!   every unit has settled.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use crossterm::event::{self, Event};

use super::input::resolve_key_event;
use super::model::{
    ActionError, ScanFailure, SelectionCmd, SelectionModel, SelectionMsg, SessionOutcome,
};
use super::render::{build_frame, draw};
use super::terminal_guard::TerminalGuard;
use super::update::{init, update};
use crate::core::config::Config;
use crate::core::errors::{KcmError, Result};
use crate::logger::ActivityLog;
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::pointer::ActivePointer;
use crate::scanner::walker::EntryScanner;

const INPUT_POLL: Duration = Duration::from_millis(50);
const IDLE_CHECK: Duration = Duration::from_millis(100);

/// Everything that can land in the session inbox.
#[derive(Debug)]
pub enum Inbound {
    /// Input from the user; subject to deferral.
    User(SelectionMsg),
    /// Result of an effect step.
    Effect(SelectionMsg),
    /// A unit of work finished.
    Settled,
    /// The terminal changed and needs repainting.
    Redraw,
}

/// Sending side of the inbox for producers outside the session.
///
/// The session ends with `ChannelClosed` once every handle is dropped and no
/// unit of work is left to report back.
#[derive(Debug, Clone)]
pub struct Inbox {
    tx: Sender<Inbound>,
    _alive: Arc<()>,
}

impl Inbox {
    pub fn send(&self, inbound: Inbound) -> Result<()> {
        self.tx.send(inbound).map_err(|_| KcmError::ChannelClosed {
            component: "selection inbox",
        })
    }
}

// ──────────────────── effects ────────────────────

/// Collaborators the effect interpreter needs.
#[derive(Debug)]
pub struct EffectContext {
    pub scanner: EntryScanner,
    pub pointer: ActivePointer,
    pub log: ActivityLog,
}

impl EffectContext {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_log(config, ActivityLog::open(&config.logging))
    }

    #[must_use]
    pub fn with_log(config: &Config, log: ActivityLog) -> Self {
        Self {
            scanner: EntryScanner::from_config(config),
            pointer: ActivePointer::new(config.pointer_path.clone()),
            log,
        }
    }

    /// Run one command to completion, delivering every resulting message.
    ///
    /// Composite commands run their children in order on the calling thread.
    pub fn run_unit(&self, cmd: &SelectionCmd, deliver: &mut dyn FnMut(SelectionMsg)) {
        match cmd {
            SelectionCmd::Sequence(steps) | SelectionCmd::Batch(steps) => {
                for step in steps {
                    self.run_unit(step, deliver);
                }
            }
            leaf => {
                if let Some(msg) = self.perform(leaf) {
                    deliver(msg);
                }
            }
        }
    }

    /// Execute a single leaf effect.
    pub fn perform(&self, cmd: &SelectionCmd) -> Option<SelectionMsg> {
        match cmd {
            SelectionCmd::None | SelectionCmd::Sequence(_) | SelectionCmd::Batch(_) => None,
            SelectionCmd::Quit => Some(SelectionMsg::Quit),
            SelectionCmd::Scan => Some(self.scan()),
            SelectionCmd::ReadActive => {
                Some(SelectionMsg::ActiveResolved(self.pointer.read_active()))
            }
            SelectionCmd::ClearActive => {
                self.clear_pointer();
                None
            }
            SelectionCmd::SetActive(entry) => {
                let record = LogEntry::new(EventType::Activate, Severity::Info)
                    .with_name(entry.name.clone())
                    .with_path(&entry.path());
                match self.pointer.set(entry) {
                    Ok(()) => {
                        self.log.record(&record.succeeded());
                        None
                    }
                    Err(e) => {
                        self.log.record(&record.failed(Some(e.code()), e.to_string()));
                        Some(SelectionMsg::Error(ActionError {
                            action: "activate",
                            path: self.pointer.path().to_path_buf(),
                            message: e.to_string(),
                        }))
                    }
                }
            }
            SelectionCmd::DeleteFile(entry) => {
                let path = entry.path();
                let record = LogEntry::new(EventType::Delete, Severity::Info)
                    .with_name(entry.name.clone())
                    .with_path(&path);
                match fs::remove_file(&path) {
                    Ok(()) => {
                        self.log.record(&record.succeeded());
                        None
                    }
                    Err(source) => {
                        let e = KcmError::io(&path, source);
                        self.log.record(&record.failed(Some(e.code()), e.to_string()));
                        Some(SelectionMsg::Error(ActionError {
                            action: "delete",
                            path,
                            message: e.to_string(),
                        }))
                    }
                }
            }
        }
    }

    fn scan(&self) -> SelectionMsg {
        let at = Utc::now();
        let result = self.scanner.scan().map_err(|e| {
            self.log.record(
                &LogEntry::new(EventType::ScanFailed, Severity::Warning)
                    .failed(Some(e.code()), e.to_string()),
            );
            ScanFailure::from(&e)
        });
        SelectionMsg::ScanCompleted { at, result }
    }

    // Clearing never surfaces an error; the next ReadActive reports the truth.
    fn clear_pointer(&self) {
        let previous = self.pointer.read_active();
        let record = LogEntry::new(EventType::Deactivate, Severity::Info)
            .with_path(self.pointer.path())
            .with_name(previous.clone());
        match self.pointer.clear() {
            Ok(()) if previous.is_empty() => {}
            Ok(()) => self.log.record(&record.succeeded()),
            Err(e) => self.log.record(&record.failed(Some(e.code()), e.to_string())),
        }
    }
}

// ──────────────────── session ────────────────────

/// A running selector: model, inbox and in-flight bookkeeping.
pub struct Session {
    model: SelectionModel,
    effects: Arc<EffectContext>,
    tx: Sender<Inbound>,
    rx: Receiver<Inbound>,
    producers: Arc<()>,
    in_flight: usize,
    deferred: VecDeque<SelectionMsg>,
    started: bool,
}

impl Session {
    #[must_use]
    pub fn new(effects: EffectContext) -> Self {
        let (tx, rx) = unbounded();
        Self {
            model: SelectionModel::new(),
            effects: Arc::new(effects),
            tx,
            rx,
            producers: Arc::new(()),
            in_flight: 0,
            deferred: VecDeque::new(),
            started: false,
        }
    }

    #[must_use]
    pub fn model(&self) -> &SelectionModel {
        &self.model
    }

    /// Handle for producers outside the session (the input thread).
    #[must_use]
    pub fn inbox(&self) -> Inbox {
        Inbox {
            tx: self.tx.clone(),
            _alive: Arc::clone(&self.producers),
        }
    }

    /// Dispatch the initial commands. Idempotent.
    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            self.dispatch(init());
        }
    }

    /// Process inbox messages until the model quits, calling `render` after
    /// every change.
    pub fn run_until_quit<F>(&mut self, mut render: F) -> Result<SessionOutcome>
    where
        F: FnMut(&SelectionModel) -> Result<()>,
    {
        self.start();
        render(&self.model)?;
        while !self.model.quit {
            match self.rx.recv_timeout(IDLE_CHECK) {
                Ok(inbound) => {
                    self.handle(inbound);
                    render(&self.model)?;
                }
                Err(RecvTimeoutError::Timeout) if !self.is_orphaned() => {}
                Err(_) => {
                    return Err(KcmError::ChannelClosed {
                        component: "selection inbox",
                    });
                }
            }
        }
        Ok(self.model.outcome())
    }

    /// Nothing is queued, running or able to send any more.
    fn is_orphaned(&self) -> bool {
        self.in_flight == 0 && self.rx.is_empty() && Arc::strong_count(&self.producers) == 1
    }

    fn handle(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::User(msg) if self.in_flight > 0 => self.deferred.push_back(msg),
            Inbound::User(msg) | Inbound::Effect(msg) => self.apply(msg),
            Inbound::Settled => {
                self.in_flight = self.in_flight.saturating_sub(1);
                while self.in_flight == 0 && !self.model.quit {
                    let Some(msg) = self.deferred.pop_front() else {
                        break;
                    };
                    self.apply(msg);
                }
            }
            Inbound::Redraw => {}
        }
    }

    fn apply(&mut self, msg: SelectionMsg) {
        let cmd = update(&mut self.model, msg);
        self.dispatch(cmd);
    }

    fn dispatch(&mut self, cmd: SelectionCmd) {
        match cmd {
            // The loop observes `model.quit` directly.
            SelectionCmd::None | SelectionCmd::Quit => {}
            SelectionCmd::Batch(children) => {
                for child in children {
                    self.dispatch(child);
                }
            }
            unit => self.spawn_unit(unit),
        }
    }

    fn spawn_unit(&mut self, cmd: SelectionCmd) {
        self.in_flight += 1;
        let effects = Arc::clone(&self.effects);
        let tx = self.tx.clone();
        thread::spawn(move || {
            // Send failures mean the session is gone; nothing left to notify.
            effects.run_unit(&cmd, &mut |msg| {
                let _ = tx.send(Inbound::Effect(msg));
            });
            let _ = tx.send(Inbound::Settled);
        });
    }
}

// ──────────────────── interactive entrypoint ────────────────────

/// Run the full-screen selector until the user quits or activates an entry.
pub fn run_interactive(config: &Config, color: bool) -> Result<SessionOutcome> {
    // stderr belongs to the selector's frame until the guard is dropped.
    let log = ActivityLog::open_quiet(&config.logging);
    let effects = EffectContext::with_log(config, log.clone());
    log.record(
        &LogEntry::new(EventType::SessionStart, Severity::Info)
            .with_path(&config.pointer_path)
            .with_details(format!("{} watch dir(s)", config.watch.len())),
    );

    let mut session = Session::new(effects);
    let guard = TerminalGuard::new().map_err(|e| KcmError::Runtime {
        details: format!("terminal setup failed: {e}"),
    })?;

    let stop = Arc::new(AtomicBool::new(false));
    let input = spawn_input_thread(session.inbox(), Arc::clone(&stop));

    let mut stdout = io::stdout();
    let result = session.run_until_quit(|model| {
        let (_, rows) = TerminalGuard::terminal_size();
        let frame = build_frame(model, usize::from(rows));
        draw(&mut stdout, &frame, rows, color).map_err(|e| KcmError::Runtime {
            details: format!("render failed: {e}"),
        })
    });

    stop.store(true, Ordering::SeqCst);
    let _ = input.join();
    drop(guard);

    let end = LogEntry::new(EventType::SessionEnd, Severity::Info);
    let end = match &result {
        Ok(SessionOutcome::Activated { name, .. }) => end.with_name(name.clone()).succeeded(),
        Ok(SessionOutcome::ActivationFailed { name, message }) => {
            end.with_name(name.clone()).failed(None, message.clone())
        }
        Ok(SessionOutcome::Quit) => end,
        Err(e) => end.failed(Some(e.code()), e.to_string()),
    };
    log.record(&end);
    result
}

fn spawn_input_thread(inbox: Inbox, stop: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::SeqCst) {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => break,
            }
            let inbound = match event::read() {
                Ok(Event::Key(key)) => resolve_key_event(&key).map(Inbound::User),
                Ok(Event::Resize(..)) => Some(Inbound::Redraw),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(inbound) = inbound
                && inbox.send(inbound).is_err()
            {
                break;
            }
        }
    })
}

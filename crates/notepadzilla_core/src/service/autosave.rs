//! Autosave scheduling.
//!
//! # Responsibility
//! - Provide a fixed-rate schedule that the session polls with its clock.
//! - Run that poll on a background thread for hosts without an event loop.
//!
//! # Invariants
//! - The schedule is fixed-rate: edits never push the next deadline back.
//! - A poll fires at most once; missed periods are skipped, not replayed.
//! - A cancelled schedule never fires again.
//! - The worker only touches the controller under its mutex, so the
//!   `Saving` check and the save itself cannot interleave with user calls.

use crate::clock::Clock;
use crate::repo::note_repo::NoteRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::service::session::SessionController;
use log::{debug, error, info};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Fixed-rate deadline tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveSchedule {
    interval_ms: i64,
    next_due_ms: Option<i64>,
}

impl AutosaveSchedule {
    /// Creates an inactive schedule. A zero interval is treated as 1 ms.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: i64::try_from(interval_ms).unwrap_or(i64::MAX).max(1),
            next_due_ms: None,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn next_due_ms(&self) -> Option<i64> {
        self.next_due_ms
    }

    pub fn is_active(&self) -> bool {
        self.next_due_ms.is_some()
    }

    /// Arms the schedule; first deadline is one interval after `now_ms`.
    pub fn start(&mut self, now_ms: i64) {
        self.next_due_ms = Some(now_ms.saturating_add(self.interval_ms));
    }

    pub fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    /// Returns `true` when a deadline has passed, advancing to the next
    /// interval boundary strictly after `now_ms`.
    pub fn poll(&mut self, now_ms: i64) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if now_ms < due {
            return false;
        }

        let missed = (now_ms - due) / self.interval_ms;
        self.next_due_ms = Some(due.saturating_add((missed + 1).saturating_mul(self.interval_ms)));
        true
    }
}

/// Background thread polling a shared controller's autosave schedule.
pub struct AutosaveWorker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveWorker {
    /// Spawns the worker. It wakes every `poll_every` and calls
    /// `autosave_tick` under the controller lock.
    pub fn spawn<R, C>(
        controller: Arc<Mutex<SessionController<R, C>>>,
        poll_every: Duration,
    ) -> Self
    where
        R: NoteRepository + SettingsRepository + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            info!("event=autosave_worker module=autosave status=start");
            loop {
                match stop_rx.recv_timeout(poll_every) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let Ok(mut guard) = controller.lock() else {
                    error!("event=autosave_worker module=autosave status=error error_code=lock_poisoned");
                    break;
                };
                match guard.autosave_tick() {
                    Ok(Some(outcome)) => {
                        debug!("event=autosave module=autosave status=ok outcome={outcome:?}");
                    }
                    Ok(None) => {}
                    // Failure is already reflected in session state; keep ticking.
                    Err(err) => {
                        error!("event=autosave module=autosave status=error error={err}");
                    }
                }
            }
            info!("event=autosave_worker module=autosave status=stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Cancels the worker and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=autosave_worker module=autosave status=error error_code=worker_panicked");
            }
        }
    }
}

impl Drop for AutosaveWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

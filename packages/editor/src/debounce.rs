//! # Sync debouncing
//!
//! Persisting after every keystroke would hammer the store, so writes
//! are debounced: each edit re-arms a deadline one quiet period away,
//! and the write happens only once the edits stop. The debouncer only
//! does the bookkeeping; the caller decides when to look at the clock
//! (see [`SyncDebouncer::poll`]) and what to do when it fires.

use std::time::{Duration, Instant};

/// Quiet period between the last edit and the persistence write.
pub const DEFAULT_SYNC_QUIET: Duration = Duration::from_millis(500);

/// Trailing-edge debouncer for store syncs.
#[derive(Debug)]
pub struct SyncDebouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl SyncDebouncer {
    pub fn new(quiet: Duration) -> SyncDebouncer {
        SyncDebouncer {
            quiet,
            deadline: None,
        }
    }

    /// Records an edit at `now`, pushing the deadline a full quiet
    /// period out. Edits in quick succession collapse into one
    /// deadline.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// Returns true once per armed deadline, when `now` has reached
    /// it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fires immediately if a sync is pending, deadline or not.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for SyncDebouncer {
    fn default() -> SyncDebouncer {
        SyncDebouncer::new(DEFAULT_SYNC_QUIET)
    }
}

//! In-memory log of recent sync errors
//!
//! Backs the error endpoint. Bounded, newest first, lost on restart.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use paramsync_core::ErrorSink;
use paramsync_domain::{ErrorKind, SyncError, ERROR_LOG_CAPACITY};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::error;

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// When the error was recorded (UTC)
    pub timestamp: DateTime<Utc>,
    /// Error category label
    pub kind: ErrorKind,
    /// Rendered error message
    pub message: String,
}

/// Bounded, most-recent-first error history
#[derive(Debug)]
pub struct ErrorLog {
    entries: Mutex<VecDeque<ErrorEntry>>,
    capacity: usize,
}

impl ErrorLog {
    /// Log with the default capacity of 100 entries.
    pub fn new() -> Self {
        Self::with_capacity(ERROR_LOG_CAPACITY)
    }

    /// Log that keeps at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }

    /// Snapshot, newest first.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no error has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn push(&self, entry: ErrorEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSink for ErrorLog {
    fn record(&self, err: &SyncError) {
        error!(kind = %err.kind(), error = %err, "Recorded sync error");
        self.push(ErrorEntry { timestamp: Utc::now(), kind: err.kind(), message: err.to_string() });
    }
}

//! Non-blocking single-entry gate for sync cycles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admits one cycle at a time. Callers that find it occupied are turned
/// away rather than queued.
#[derive(Debug, Clone, Default)]
pub struct CycleGate {
    busy: Arc<AtomicBool>,
}

/// Held for the duration of a cycle; dropping it reopens the gate.
#[derive(Debug)]
#[must_use = "the gate reopens as soon as the guard is dropped"]
pub struct CycleGuard {
    busy: Arc<AtomicBool>,
}

impl CycleGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if a cycle is already in flight.
    pub fn try_enter(&self) -> Option<CycleGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { busy: Arc::clone(&self.busy) })
    }

    /// `true` while a guard is alive.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

//! Per-cycle summary

use paramsync_domain::SyncError;

/// How a cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Rows were fetched and diffed; individual updates may still have failed.
    Completed,
    /// A health check failed; nothing was fetched or updated.
    Unhealthy(SyncError),
    /// The source returned no rows.
    NoRows,
    /// Fetch (or anything else before the update loop) failed.
    Failed(SyncError),
}

/// Counters collected while running one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// How the cycle ended
    pub outcome: CycleOutcome,
    /// Rows returned by the source
    pub rows_fetched: usize,
    /// Rows whose raw value differed from the cache
    pub changes_detected: usize,
    /// Updates the destination accepted
    pub updates_applied: usize,
    /// Updates that stayed rate limited after every retry
    pub updates_rate_limited: usize,
    /// Updates that failed with an error
    pub updates_failed: usize,
}

impl CycleReport {
    /// Empty report ending in `outcome`.
    pub fn with_outcome(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            rows_fetched: 0,
            changes_detected: 0,
            updates_applied: 0,
            updates_rate_limited: 0,
            updates_failed: 0,
        }
    }

    /// Completed report with no changes yet.
    pub fn completed(rows_fetched: usize) -> Self {
        Self { rows_fetched, ..Self::with_outcome(CycleOutcome::Completed) }
    }

    /// `true` if rows were fetched and diffed.
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Completed)
    }

    /// Updates that were attempted but not applied.
    pub fn undelivered(&self) -> usize {
        self.updates_rate_limited + self.updates_failed
    }
}

//! Scheduling infrastructure for the sync cycle
//!
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Bounded wait for an in-flight cycle on shutdown

pub mod error;
pub mod gate;
pub mod sync_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use gate::{CycleGate, CycleGuard};
pub use sync_scheduler::{SchedulerStats, SyncScheduler, SyncSchedulerConfig};

//! # paramsync Core
//!
//! Pure synchronization logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the row source, destination API, token
//!   provider and error sink
//! - The change-detection cache
//! - The health gate and the sync cycle orchestrator
//! - A clock abstraction for time-dependent components
//!
//! ## Architecture Principles
//! - Only depends on `paramsync-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;
pub mod time;

// Re-export specific items to avoid ambiguity
pub use sync::change_cache::ChangeCache;
pub use sync::health::HealthGate;
pub use sync::ports::{
    AccessTokenProvider, CycleRunner, ErrorSink, ParameterDestination, ParameterSource,
};
pub use sync::report::{CycleOutcome, CycleReport};
pub use sync::service::{SyncCycleConfig, SyncService};
pub use time::{Clock, MockClock, SystemClock};

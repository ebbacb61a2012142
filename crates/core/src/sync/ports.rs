//! Port interfaces for sync operations

use async_trait::async_trait;
use paramsync_domain::{ParameterReading, ParameterUpdate, Result, SyncError, UpdateOutcome};

use super::report::CycleReport;

/// Trait for providing bearer tokens
///
/// Implementations handle refresh themselves; callers ask for a token on
/// every request.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    async fn access_token(&self) -> Result<String>;
}

/// Source of parameter readings (the upstream relational table)
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Latest readings, most recent first, bounded by the configured limit
    async fn fetch_latest(&self) -> Result<Vec<ParameterReading>>;

    /// Cheap round trip used by the health gate
    async fn ping(&self) -> Result<()>;
}

/// Destination control system
#[async_trait]
pub trait ParameterDestination: Send + Sync {
    /// Authenticated lightweight read; only a 200 counts as healthy
    async fn check_health(&self) -> Result<()>;

    /// Push one changed value
    async fn update_parameter(&self, update: &ParameterUpdate) -> Result<UpdateOutcome>;
}

/// Append-only sink for errors caught during a cycle
pub trait ErrorSink: Send + Sync {
    /// Keep `error` for later inspection
    fn record(&self, error: &SyncError);
}

/// Something the scheduler can run once per tick
#[async_trait]
pub trait CycleRunner: Send + Sync {
    /// Run one complete cycle; failures end up in the report
    async fn run_cycle(&self) -> CycleReport;
}

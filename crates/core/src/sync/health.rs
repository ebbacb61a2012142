//! Pre-cycle reachability checks for the source and the destination

use std::sync::Arc;

use paramsync_domain::Result;
use tracing::debug;

use super::ports::{ParameterDestination, ParameterSource};

/// Service label used in destination health errors
pub const DESTINATION_SERVICE: &str = "destination API";
/// Service label used in database health errors
pub const SOURCE_SERVICE: &str = "source database";

/// Gate run at the start of every cycle.
///
/// Whatever the underlying failure (transport, auth, unexpected status,
/// wrong row count), callers only ever see `SyncError::HealthCheck`.
pub struct HealthGate {
    source: Arc<dyn ParameterSource>,
    destination: Arc<dyn ParameterDestination>,
}

impl HealthGate {
    /// Gate over both health checks.
    pub fn new(source: Arc<dyn ParameterSource>, destination: Arc<dyn ParameterDestination>) -> Self {
        Self { source, destination }
    }

    /// Destination check; any failure becomes `SyncError::HealthCheck`.
    pub async fn check_api_health(&self) -> Result<()> {
        self.destination.check_health().await.map_err(|e| e.into_health_check(DESTINATION_SERVICE))
    }

    /// Source check; any failure becomes `SyncError::HealthCheck`.
    pub async fn check_database_health(&self) -> Result<()> {
        self.source.ping().await.map_err(|e| e.into_health_check(SOURCE_SERVICE))
    }

    /// Run both checks concurrently; the first failure wins.
    pub async fn check(&self) -> Result<()> {
        tokio::try_join!(self.check_api_health(), self.check_database_health())?;
        debug!("Health checks passed");
        Ok(())
    }
}

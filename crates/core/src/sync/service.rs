//! Sync cycle orchestrator
//!
//! Drives one poll-diff-update pass:
//!
//! 1. Health gate (source and destination, concurrently)
//! 2. Fetch the newest readings
//! 3. Diff each reading's raw value against the previous-value cache
//! 4. Throttled update for every changed reading
//! 5. Advance the cache to the observed value, whether or not step 4 worked
//!
//! Step 5 makes delivery at-most-once per observed change: a failed push is
//! logged and recorded, and the value is not pushed again unless the source
//! changes it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use paramsync_domain::{
    ChangeKey, ParameterReading, Result, SyncConfig, SyncError, UpdateOutcome,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::change_cache::ChangeCache;
use super::health::HealthGate;
use super::ports::{CycleRunner, ErrorSink, ParameterDestination, ParameterSource};
use super::report::{CycleOutcome, CycleReport};

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Pacing and presentation settings for a cycle
#[derive(Debug, Clone)]
pub struct SyncCycleConfig {
    /// Pause before each downstream update
    pub throttle: Duration,
    /// Zone used for the cycle timestamp in log lines
    pub display_timezone: Tz,
}

impl SyncCycleConfig {
    /// Build from the application config, validating the time zone name.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let display_timezone = config.display_timezone.parse::<Tz>().map_err(|e| {
            SyncError::Config(format!("Invalid display time zone {}: {e}", config.display_timezone))
        })?;

        Ok(Self { throttle: config.throttle(), display_timezone })
    }
}

impl Default for SyncCycleConfig {
    fn default() -> Self {
        Self { throttle: Duration::from_millis(50), display_timezone: chrono_tz::Australia::Brisbane }
    }
}

/// Orchestrates sync cycles against injected ports
///
/// The cache lives behind a mutex that is never held across an await; the
/// scheduler guarantees only one cycle runs at a time.
pub struct SyncService {
    source: Arc<dyn ParameterSource>,
    destination: Arc<dyn ParameterDestination>,
    health: HealthGate,
    errors: Arc<dyn ErrorSink>,
    cache: Mutex<ChangeCache>,
    config: SyncCycleConfig,
}

impl SyncService {
    /// Service with an empty cache.
    pub fn new(
        source: Arc<dyn ParameterSource>,
        destination: Arc<dyn ParameterDestination>,
        errors: Arc<dyn ErrorSink>,
        config: SyncCycleConfig,
    ) -> Self {
        Self::with_cache(source, destination, errors, config, ChangeCache::new())
    }

    /// Start from a pre-populated cache.
    pub fn with_cache(
        source: Arc<dyn ParameterSource>,
        destination: Arc<dyn ParameterDestination>,
        errors: Arc<dyn ErrorSink>,
        config: SyncCycleConfig,
        cache: ChangeCache,
    ) -> Self {
        let health = HealthGate::new(Arc::clone(&source), Arc::clone(&destination));
        Self { source, destination, health, errors, cache: Mutex::new(cache), config }
    }

    /// Copy of the current previous-value cache.
    pub fn cache_snapshot(&self) -> ChangeCache {
        self.cache.lock().clone()
    }

    /// Cached raw value for `key`; `None` if never observed.
    pub fn cached_value(&self, key: &ChangeKey) -> Option<Option<f64>> {
        self.cache.lock().get(key)
    }

    /// Run one cycle. Never fails: errors end up in the report, the log and
    /// the error sink.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> CycleReport {
        if let Err(err) = self.health.check().await {
            warn!(error = %err, "Skipping updates: health check failed");
            self.errors.record(&err);
            return CycleReport::with_outcome(CycleOutcome::Unhealthy(err));
        }

        match self.sync_latest().await {
            Ok(report) => report,
            Err(err) => {
                error!(error = %err, kind = %err.kind(), "Sync cycle failed");
                self.errors.record(&err);
                CycleReport::with_outcome(CycleOutcome::Failed(err))
            }
        }
    }

    async fn sync_latest(&self) -> Result<CycleReport> {
        let readings = self.source.fetch_latest().await?;
        let Some(newest) = readings.first() else {
            info!("No values retrieved from database");
            return Ok(CycleReport::with_outcome(CycleOutcome::NoRows));
        };

        let source_time = format_epoch(newest.source_updated_at);
        let cycle_time = Utc::now().with_timezone(&self.config.display_timezone);
        debug!(rows = readings.len(), "Fetched latest values");

        let mut report = CycleReport::completed(readings.len());

        for reading in &readings {
            let key = reading.key();
            let changed = self.cache.lock().has_changed(&key, reading.value);

            if changed {
                if report.changes_detected == 0 {
                    info!(
                        source_updated = %source_time,
                        detected_at = %cycle_time.format(TIMESTAMP_FORMAT),
                        "Value changes detected"
                    );
                }
                report.changes_detected += 1;
                info!(
                    key = %key,
                    previous = ?self.cache.lock().get(&key).flatten(),
                    current = ?reading.value,
                    "Parameter changed"
                );

                if !self.config.throttle.is_zero() {
                    tokio::time::sleep(self.config.throttle).await;
                }
                self.deliver(reading, &mut report).await;
            }

            self.cache.lock().set(key, reading.value);
        }

        if report.changes_detected == 0 {
            info!(
                checked_at = %cycle_time.format(TIMESTAMP_FORMAT),
                rows = report.rows_fetched,
                "No value changes found"
            );
        } else {
            info!(
                rows = report.rows_fetched,
                changes = report.changes_detected,
                applied = report.updates_applied,
                rate_limited = report.updates_rate_limited,
                failed = report.updates_failed,
                "Sync cycle completed"
            );
        }

        Ok(report)
    }

    async fn deliver(&self, reading: &ParameterReading, report: &mut CycleReport) {
        let update = reading.to_update();

        match self.destination.update_parameter(&update).await {
            Ok(UpdateOutcome::Applied) => {
                report.updates_applied += 1;
            }
            Ok(UpdateOutcome::RateLimited { attempts }) => {
                warn!(
                    entity_id = update.entity_id,
                    parameter = %update.parameter_name,
                    attempts,
                    "Update not delivered: rate limited on every attempt"
                );
                report.updates_rate_limited += 1;
            }
            Err(err) => {
                error!(
                    entity_id = update.entity_id,
                    parameter = %update.parameter_name,
                    error = %err,
                    "Update failed"
                );
                self.errors.record(&err);
                report.updates_failed += 1;
            }
        }
    }
}

#[async_trait]
impl CycleRunner for SyncService {
    async fn run_cycle(&self) -> CycleReport {
        self.run_once().await
    }
}

fn format_epoch(epoch_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .map_or_else(|| "Invalid Date".to_string(), |dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

//! Interval scheduler for the sync cycle.
//!
//! Runs one cycle immediately on start, then one per interval. Each tick
//! tries to pass the [`CycleGate`]; if the previous cycle is still running
//! the tick is dropped and logged, never queued. Cycles run on their own task
//! so an overrun never delays the tick loop. A cycle that panics is caught,
//! logged and counted; the next tick runs as usual.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use paramsync_core::CycleRunner;
//! use paramsync_infra::scheduling::{SyncScheduler, SyncSchedulerConfig};
//!
//! # async fn example(runner: Arc<dyn CycleRunner>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut scheduler = SyncScheduler::new(
//!     runner,
//!     SyncSchedulerConfig { interval: Duration::from_secs(60), ..Default::default() },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use paramsync_core::CycleRunner;
use paramsync_domain::SyncConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};
use super::gate::CycleGate;

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for sync scheduler
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Time between cycle starts
    pub interval: Duration,
    /// How long `stop` waits for an in-flight cycle before abandoning it
    pub shutdown_grace: Duration,
}

impl SyncSchedulerConfig {
    /// Poll interval from configuration, default grace period.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self { interval: config.poll_interval(), ..Self::default() }
    }
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: SyncConfig::default().poll_interval(),
            shutdown_grace: Duration::from_secs(30),
        }
    }
}

/// Counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Cycles that passed the gate
    pub cycles_started: u64,
    /// Ticks dropped because a cycle was still running
    pub ticks_skipped: u64,
    /// Cycles that ended in a panic
    pub cycles_panicked: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cycles_started: AtomicU64,
    ticks_skipped: AtomicU64,
    cycles_panicked: AtomicU64,
}

/// Context for the tick loop
struct TickContext {
    runner: Arc<dyn CycleRunner>,
    gate: CycleGate,
    in_flight: TaskHandle,
    counters: Arc<Counters>,
}

/// Periodic driver for a [`CycleRunner`]
pub struct SyncScheduler {
    runner: Arc<dyn CycleRunner>,
    config: SyncSchedulerConfig,
    gate: CycleGate,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    in_flight: TaskHandle,
    counters: Arc<Counters>,
}

impl SyncScheduler {
    /// Create a stopped scheduler for `runner`.
    pub fn new(runner: Arc<dyn CycleRunner>, config: SyncSchedulerConfig) -> Self {
        Self {
            runner,
            config,
            gate: CycleGate::new(),
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(Mutex::new(None)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Start the scheduler
    ///
    /// Spawns the tick loop; the first cycle starts right away.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self), fields(interval_ms = self.config.interval.as_millis()))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting sync scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let context = TickContext {
            runner: Arc::clone(&self.runner),
            gate: self.gate.clone(),
            in_flight: Arc::clone(&self.in_flight),
            counters: Arc::clone(&self.counters),
        };
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::tick_loop(context, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the scheduler
    ///
    /// Cancels the tick loop, then waits up to `shutdown_grace` for a cycle
    /// that is already running. A cycle still running after that is aborted.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running, or if the tick loop does
    /// not wind down.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping sync scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        if let Some(mut cycle) = self.in_flight.lock().await.take() {
            if !cycle.is_finished() {
                info!(
                    grace_secs = self.config.shutdown_grace.as_secs(),
                    "Waiting for in-flight sync cycle"
                );
            }
            match tokio::time::timeout(self.config.shutdown_grace, &mut cycle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.is_panic() => error!(error = %e, "Sync cycle panicked"),
                Ok(Err(_)) => {}
                Err(_) => {
                    warn!("In-flight sync cycle did not finish in time; abandoning it");
                    cycle.abort();
                }
            }
        }

        info!("Sync scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// `true` while a cycle holds the gate.
    pub fn is_cycle_in_flight(&self) -> bool {
        self.gate.is_busy()
    }

    /// Counters since construction.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            cycles_started: self.counters.cycles_started.load(Ordering::Relaxed),
            ticks_skipped: self.counters.ticks_skipped.load(Ordering::Relaxed),
            cycles_panicked: self.counters.cycles_panicked.load(Ordering::Relaxed),
        }
    }

    async fn tick_loop(context: TickContext, interval: Duration, cancel: CancellationToken) {
        let TickContext { runner, gate, in_flight, counters } = context;

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Tick loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(guard) = gate.try_enter() else {
                        counters.ticks_skipped.fetch_add(1, Ordering::Relaxed);
                        warn!("Previous sync cycle still running; skipping this tick");
                        continue;
                    };

                    let cycle = counters.cycles_started.fetch_add(1, Ordering::Relaxed) + 1;
                    let runner = Arc::clone(&runner);
                    let counters = Arc::clone(&counters);
                    let handle = tokio::spawn(async move {
                        let _guard = guard;
                        let started = Instant::now();
                        let result = AssertUnwindSafe(runner.run_cycle()).catch_unwind().await;
                        let elapsed_ms =
                            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                        match result {
                            Ok(report) => debug!(
                                cycle,
                                outcome = ?report.outcome,
                                elapsed_ms,
                                "Sync cycle finished"
                            ),
                            Err(payload) => {
                                counters.cycles_panicked.fetch_add(1, Ordering::Relaxed);
                                error!(
                                    cycle,
                                    elapsed_ms,
                                    panic = %panic_message(payload.as_ref()),
                                    "Sync cycle panicked"
                                );
                            }
                        }
                    });
                    *in_flight.lock().await = Some(handle);
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Ensure scheduler is stopped when dropped
impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() && self.is_running() {
            warn!("SyncScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}

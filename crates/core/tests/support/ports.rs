//! Mock port implementations for testing

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paramsync_core::{ErrorSink, ParameterDestination, ParameterSource};
use paramsync_domain::{
    ParameterReading, ParameterUpdate, Result as DomainResult, SyncError, UpdateOutcome,
};

/// Source that replays one scripted response per fetch.
///
/// Once the script is exhausted every further fetch returns no rows.
#[derive(Default, Clone)]
pub struct ScriptedSource {
    polls: Arc<Mutex<VecDeque<DomainResult<Vec<ParameterReading>>>>>,
    unhealthy: Arc<AtomicBool>,
    fetch_calls: Arc<AtomicUsize>,
    ping_calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll(self, rows: Vec<ParameterReading>) -> Self {
        self.polls.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn with_failed_poll(self, error: SyncError) -> Self {
        self.polls.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn ping_calls(&self) -> usize {
        self.ping_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParameterSource for ScriptedSource {
    async fn fetch_latest(&self) -> DomainResult<Vec<ParameterReading>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.polls.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn ping(&self) -> DomainResult<()> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.unhealthy.load(Ordering::SeqCst) {
            Err(SyncError::connection("source database", "connection refused"))
        } else {
            Ok(())
        }
    }
}

/// Destination that records every update it receives.
#[derive(Default, Clone)]
pub struct RecordingDestination {
    updates: Arc<Mutex<Vec<ParameterUpdate>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    rate_limited: Arc<Mutex<HashSet<String>>>,
    unhealthy: Arc<AtomicBool>,
}

impl RecordingDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates for `parameter` fail with an API error.
    pub fn fail_parameter(&self, parameter: &str) {
        self.failing.lock().unwrap().insert(parameter.to_string());
    }

    /// Updates for `parameter` exhaust their retry budget.
    pub fn rate_limit_parameter(&self, parameter: &str) {
        self.rate_limited.lock().unwrap().insert(parameter.to_string());
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    pub fn updates(&self) -> Vec<ParameterUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ParameterDestination for RecordingDestination {
    async fn check_health(&self) -> DomainResult<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            Err(SyncError::Authentication("status 401".into()))
        } else {
            Ok(())
        }
    }

    async fn update_parameter(&self, update: &ParameterUpdate) -> DomainResult<UpdateOutcome> {
        self.updates.lock().unwrap().push(update.clone());

        if self.failing.lock().unwrap().contains(&update.parameter_name) {
            return Err(SyncError::api(
                "update",
                update.entity_id,
                update.parameter_name.clone(),
                "status 500: boom",
            ));
        }
        if self.rate_limited.lock().unwrap().contains(&update.parameter_name) {
            return Ok(UpdateOutcome::RateLimited { attempts: 4 });
        }
        Ok(UpdateOutcome::Applied)
    }
}

/// Error sink that keeps everything it is given.
#[derive(Default, Clone)]
pub struct CollectingErrorSink {
    errors: Arc<Mutex<Vec<SyncError>>>,
}

impl CollectingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<SyncError> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorSink for CollectingErrorSink {
    fn record(&self, error: &SyncError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

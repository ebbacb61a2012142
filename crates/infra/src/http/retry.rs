//! Backoff schedule for rate-limited requests

use std::time::Duration;

use paramsync_domain::SyncConfig;

/// Exponential backoff without jitter.
///
/// The delay before retry `k` (1-based) is `base_delay * 2^k`, so a base of
/// one second yields 2 s, 4 s, 8 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Exponent cap; keeps the multiplier within `u32`.
    const MAX_SHIFT: u32 = 16;

    /// Policy allowing `max_retries` retries after the first attempt.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Retry budget and base delay from configuration.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.max_retries, config.retry_base_delay())
    }

    /// Retries allowed after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// First attempt plus retries.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = 1u32 << retry.min(Self::MAX_SHIFT);
        self.base_delay.saturating_mul(multiplier)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

//! Backoff policy for sheet creation retries.
//!
//! The retry loop itself lives inline in the exporter; this module only
//! decides how many attempts are allowed and how long to sleep between them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt limit and capped exponential backoff for sheet creation.
///
/// With the defaults the exporter tries three times, sleeping 4 s after the
/// first collision and 8 s after the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Sleep after the first failed attempt, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound for any single sleep, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    3
}

fn default_base_delay() -> u64 {
    4000
}

fn default_max_delay() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryConfig {
    /// Creates the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attempt limit.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the first sleep.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the sleep cap.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }

    /// Whether another attempt may follow `attempt` completed attempts.
    #[must_use]
    pub fn allows_retry_after(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }

    /// Sleep after the `attempt`-th failure (1-based): `base * 2^(attempt - 1)`,
    /// capped at `max_delay_ms`.
    #[must_use]
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let millis = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(doublings))
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }
}

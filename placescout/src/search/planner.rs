//! Per-task time budgets.

use std::time::Duration;

use crate::config::SearchConfig;

/// Result count that earns exactly the base budget.
pub const REFERENCE_RESULTS: usize = 20;

/// Scales a task's deadline with the number of results it has to produce.
///
/// `plan(n) = clamp(base * n / reference, min, max)`, with a missing (zero)
/// result count treated as `reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPlanner {
    base: Duration,
    reference_results: usize,
    min: Duration,
    max: Duration,
}

impl TimeoutPlanner {
    /// Creates a planner. `reference_results` of zero is treated as one.
    #[must_use]
    pub fn new(base: Duration, reference_results: usize, min: Duration, max: Duration) -> Self {
        Self {
            base,
            reference_results: reference_results.max(1),
            min,
            max,
        }
    }

    /// Builds the planner described by the search settings.
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            Duration::from_secs(config.base_timeout_secs),
            REFERENCE_RESULTS,
            Duration::from_secs(config.min_timeout_secs),
            Duration::from_secs(config.max_timeout_secs),
        )
    }

    /// Budget for a task producing up to `max_results` records per keyword.
    #[must_use]
    pub fn plan(&self, max_results: usize) -> Duration {
        let results = if max_results == 0 {
            self.reference_results
        } else {
            max_results
        };

        let scaled_ms = self.base.as_millis() * results as u128 / self.reference_results as u128;
        let scaled = Duration::from_millis(u64::try_from(scaled_ms).unwrap_or(u64::MAX));

        // min before max so the ceiling wins if the bounds are inverted
        scaled.max(self.min).min(self.max)
    }

    /// The ceiling no plan exceeds.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.max
    }
}

impl Default for TimeoutPlanner {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

//! Retry policy for audit persistence.

use std::time::Duration;

/// Exponential backoff with a bounded attempt count.
///
/// Attempt numbering: attempt 0 is the first try; once `is_dead_letter`
/// returns true for the next attempt number, the event is routed to the
/// dead-letter path instead of retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u8,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy with an explicit retry budget.
    #[must_use]
    pub fn new(max_retries: u8, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Maximum number of retries after the initial attempt.
    #[must_use]
    pub fn max_retries(&self) -> u8 {
        self.max_retries
    }

    /// Delay before the retry following `attempt`.
    #[must_use]
    pub fn next_delay(&self, attempt: u8) -> Duration {
        let factor = 2u32.saturating_pow(u32::from(attempt));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// True when `attempt` exceeds the retry budget.
    #[must_use]
    pub fn is_dead_letter(&self, attempt: u8) -> bool {
        attempt > self.max_retries
    }
}

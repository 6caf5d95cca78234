// ── Bounded exponential backoff ──

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How transient failures are retried.
///
/// `max_attempts` counts calls, not retries: with the default of 3 a
/// persistently failing operation is issued exactly three times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    /// Spread delays by up to ±25%, phase-shifted per target so parallel
    /// updates don't retry in lockstep.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            factor: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Retry up to `max_attempts` calls with no delay between them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
            ..Self::default()
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self::immediate(1)
    }

    /// Effective call bound. Zero is treated as one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Computed backoff after the `attempt`-th failed call (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_for(attempt, 0)
    }

    /// Backoff with the jitter phase taken from `seed`, so different
    /// targets land on different delays for the same attempt.
    pub fn backoff_for(&self, attempt: u32, seed: u64) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base = self.base_delay.as_secs_f64() * self.factor.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        // Deterministic jitter from the attempt number and the seed.
        let jitter_factor = if self.jitter {
            let phase = f64::from(u32::try_from(seed % 1024).unwrap_or(0)) * 0.618;
            1.0 + 0.25 * (f64::from(attempt) * 7.3 + phase).sin()
        } else {
            1.0
        };
        let with_jitter = (capped * jitter_factor).max(0.0);

        Duration::try_from_secs_f64(with_jitter).unwrap_or(self.max_delay)
    }

    /// Delay before the next call: the remote's `Retry-After` hint when it
    /// is longer than the computed backoff, else the backoff. Hints are
    /// capped at `max_delay`.
    pub fn delay(&self, attempt: u32, hint: Option<Duration>, seed: u64) -> Duration {
        let backoff = self.backoff_for(attempt, seed);
        hint.map_or(backoff, |h| h.min(self.max_delay).max(backoff))
    }
}

//! Retry policy for feed refreshes.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Backoff applied after consecutive fetch failures.
///
/// The n-th consecutive failure waits `initial * multiplier^(n-1)`, capped at
/// `max_backoff_ms`, optionally spread by `jitter`. There is no attempt limit:
/// a feed keeps retrying at the ceiling until the upstream recovers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay after the first failure (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Growth factor per additional failure. Must be >= 1.0.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Relative jitter in [0.0, 1.0]; 0.1 spreads delays by +/-10%.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_initial_backoff() -> u64 {
    5_000 // 5 seconds
}

fn default_max_backoff() -> u64 {
    300_000 // 5 minutes
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl RetryPolicy {
    /// Deterministic policy without jitter.
    pub fn fixed(initial: Duration, max: Duration, multiplier: f64) -> Self {
        Self {
            initial_backoff_ms: initial.as_millis() as u64,
            max_backoff_ms: max.as_millis() as u64,
            multiplier,
            jitter: 0.0,
        }
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Backoff before the next attempt after `consecutive_failures` failures,
    /// without jitter. Zero failures means no backoff.
    pub fn backoff_for(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_failures - 1).min(64) as i32;
        let raw = self.initial_backoff_ms as f64 * self.multiplier.max(1.0).powi(exponent);
        let capped = raw.min(self.max_backoff_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Backoff with jitter applied, still bounded by the ceiling.
    pub fn delay_after_failure(&self, consecutive_failures: u32) -> Duration {
        let base = self.backoff_for(consecutive_failures);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || base.is_zero() {
            return base;
        }
        let factor = 1.0 + rand::rng().random_range(-jitter..=jitter);
        let jittered = base.as_millis() as f64 * factor;
        Duration::from_millis(jittered.clamp(0.0, self.max_backoff_ms as f64) as u64)
    }
}

//! Retry and backoff configuration

use crate::exchange::SignalKind;
use std::time::Duration;

/// Exponential backoff for one class of failure
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier applied after each consecutive attempt
    pub factor: f64,
}

impl Backoff {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            factor: 1.0,
        }
    }

    pub fn exponential(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            factor: 2.0,
        }
    }

    /// Delay for a given consecutive attempt (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let base = self.initial_delay.as_millis() as f64 * self.factor.powi(exponent);
        let capped = base.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

/// How the engine reacts to exchange signals and store write failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Consecutive failed attempts tolerated per series before giving up
    pub max_attempts: u32,
    pub rate_limit: Backoff,
    pub maintenance: Backoff,
    /// Unrecognized error codes
    pub other: Backoff,
    /// Store write failures
    pub write: Backoff,
}

impl RetryPolicy {
    /// Policy with every pause set to zero (tests, dry runs)
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            rate_limit: Backoff::fixed(Duration::ZERO),
            maintenance: Backoff::fixed(Duration::ZERO),
            other: Backoff::fixed(Duration::ZERO),
            write: Backoff::fixed(Duration::ZERO),
        }
    }

    pub fn pause_for_signal(&self, kind: SignalKind, attempt: u32) -> Duration {
        let backoff = match kind {
            SignalKind::RateLimited => &self.rate_limit,
            SignalKind::Maintenance => &self.maintenance,
            SignalKind::Other => &self.other,
        };
        backoff.delay_for_attempt(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            rate_limit: Backoff::exponential(Duration::from_secs(20), Duration::from_secs(120)),
            maintenance: Backoff::fixed(Duration::from_secs(1)),
            other: Backoff::exponential(Duration::from_secs(1), Duration::from_secs(30)),
            write: Backoff::exponential(Duration::from_secs(1), Duration::from_secs(30)),
        }
    }
}

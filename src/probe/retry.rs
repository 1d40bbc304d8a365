//! Retry decisions for transient probe outcomes.
//!
//! Only [`OutcomeClass::ServerError`] and [`OutcomeClass::Timeout`] are
//! retryable. Every other class is authoritative on its first observation.
//!
//! Retries are immediate by default. A [`Backoff`] can be configured to space
//! them out; the delay travels with the [`RetryDecision`].
//!
//! # Example
//!
//! ```
//! use statuscan_core::probe::{OutcomeClass, RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::new(2);
//! match policy.decide(OutcomeClass::ServerError, 0) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         println!("retrying in {delay:?} (attempt index {attempt})");
//!     }
//!     RetryDecision::DoNotRetry { reason } => println!("done: {reason}"),
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument};

use super::OutcomeClass;

/// Default retry budget (attempts per URL = retries + 1).
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Maximum jitter added to exponential delays.
const MAX_JITTER: Duration = Duration::from_millis(250);

/// Returns whether a URL whose attempt `attempt_index` (zero-based) ended in
/// `outcome` should be attempted again.
#[must_use]
pub fn should_retry(outcome: OutcomeClass, attempt_index: u32, max_retries: u32) -> bool {
    outcome.is_transient() && attempt_index < max_retries
}

/// Delay strategy between attempts of the same URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Re-attempt immediately.
    #[default]
    None,
    /// Wait the same delay before every retry.
    Fixed(Duration),
    /// `min(base * 2^attempt_index, max)` plus up to 250ms of jitter.
    Exponential {
        /// Delay before the first retry.
        base: Duration,
        /// Cap applied before jitter.
        max: Duration,
    },
}

impl Backoff {
    /// Delay to wait after attempt `attempt_index` (zero-based) failed.
    #[must_use]
    pub fn delay(&self, attempt_index: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt_index);
                let delay = base.saturating_mul(factor).min(max);
                delay.saturating_add(jitter())
            }
        }
    }
}

fn jitter() -> Duration {
    let mut rng = rand::thread_rng();
    let max_ms = u64::try_from(MAX_JITTER.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.gen_range(0..=max_ms))
}

/// Decision on whether to re-attempt a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Attempt again after `delay`.
    Retry {
        /// How long to wait before the next attempt.
        delay: Duration,
        /// Zero-based index of the next attempt.
        attempt: u32,
    },
    /// The outcome is final.
    DoNotRetry {
        /// Human-readable reason, for logs.
        reason: String,
    },
}

/// Retry budget plus backoff strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    /// Creates a policy with `max_retries` immediate retries.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::None,
        }
    }

    /// Replaces the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the retry budget.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the upper bound on attempts per URL.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns the configured backoff.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Decides what to do after attempt `attempt_index` (zero-based) ended in `outcome`.
    #[instrument(level = "trace", skip(self), fields(max_retries = self.max_retries))]
    pub fn decide(&self, outcome: OutcomeClass, attempt_index: u32) -> RetryDecision {
        if !outcome.is_transient() {
            return RetryDecision::DoNotRetry {
                reason: format!("{outcome} is final"),
            };
        }

        if !should_retry(outcome, attempt_index, self.max_retries) {
            debug!(attempt_index, "retry budget exhausted");
            return RetryDecision::DoNotRetry {
                reason: format!("retry budget ({}) exhausted", self.max_retries),
            };
        }

        RetryDecision::Retry {
            delay: self.backoff.delay(attempt_index),
            attempt: attempt_index + 1,
        }
    }
}

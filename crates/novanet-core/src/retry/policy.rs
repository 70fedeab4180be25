use std::time::Duration;

use crate::classify::ClassifiedError;

/// Jitter adds up to this fraction of the computed delay.
const JITTER_FRACTION: f64 = 0.1;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential (or constant) backoff policy with caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_retries: u32,
    /// Delay before the first retry; constant delay when `exponential` is off.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    /// Growth per attempt when `exponential` is on.
    pub backoff_factor: f64,
    pub exponential: bool,
    /// Add up to 10% random jitter to exponential delays.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            backoff_factor: 2.0,
            exponential: true,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Decide whether to retry after `attempt` failed with `error`.
    ///
    /// `attempt` is 1-based (1 = first attempt). Retries only while
    /// `attempt < max_retries` and the error is retryable.
    pub fn decide(&self, attempt: u32, error: &ClassifiedError) -> RetryDecision {
        self.decide_with(attempt, error.retryable, rand::random::<f64>())
    }

    /// `decide` with an explicit random sample in `[0, 1)` for the jitter.
    pub fn decide_with(&self, attempt: u32, retryable: bool, random: f64) -> RetryDecision {
        if !retryable || attempt >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff_delay(attempt, random))
    }

    /// Delay before the retry that follows failed attempt `attempt` (1-based).
    ///
    /// Exponential: `min(base * factor^(attempt-1) + jitter, max)` where
    /// jitter is `delay * 0.1 * random`. Otherwise the constant base delay.
    pub fn backoff_delay(&self, attempt: u32, random: f64) -> Duration {
        if !self.exponential {
            return self.base_delay;
        }
        let exp = attempt.saturating_sub(1).min(32) as i32;
        let raw_ms = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(exp);
        let jitter_ms = if self.jitter {
            raw_ms * JITTER_FRACTION * random.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let max_ms = self.max_delay.as_millis() as f64;
        let delay_ms = (raw_ms + jitter_ms).min(max_ms);
        Duration::from_millis(delay_ms.max(0.0) as u64)
    }
}

//! Retry loop: run an async attempt until success, exhaustion or cancellation.

use std::future::Future;

use super::policy::{RetryDecision, RetryPolicy};
use crate::classify::{classify, ClassifiedError, Failure};
use crate::control::CancelToken;
use crate::request::RequestError;

/// Observer invoked after each backoff delay, before the next attempt.
pub type OnRetry<'a> = &'a (dyn Fn(&ClassifiedError, u32) + Send + Sync);

/// Phases of one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Attempting,
    Success,
    Failed,
    Retrying,
    Exhausted,
}

impl RetryPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            RetryPhase::Attempting => "attempting",
            RetryPhase::Success => "success",
            RetryPhase::Failed => "failed",
            RetryPhase::Retrying => "retrying",
            RetryPhase::Exhausted => "exhausted",
        }
    }
}

/// Runs `attempt_fn` until it succeeds or the policy says to stop.
///
/// Attempts are strictly sequential. Each failure is classified once; the
/// final classified error is returned, intermediate ones only reach
/// `on_retry(error, attempt)`. The backoff wait suspends the task and is
/// raced against `cancel`; once cancelled, `attempt_fn` is never called again.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    context: Option<&str>,
    on_retry: Option<OnRetry<'_>>,
    mut attempt_fn: F,
) -> Result<T, ClassifiedError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Failure>,
{
    if policy.max_retries == 0 {
        return Err(classify(
            RequestError::InvalidConfig("max_retries must be at least 1".to_string()),
            context,
        ));
    }
    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(classify(RequestError::Cancelled, context));
        }
        tracing::debug!(attempt, phase = RetryPhase::Attempting.as_str());

        let error = match attempt_fn(attempt).await {
            Ok(value) => {
                tracing::debug!(attempt, phase = RetryPhase::Success.as_str());
                return Ok(value);
            }
            Err(e) => classify(e, context),
        };
        tracing::debug!(
            attempt,
            phase = RetryPhase::Failed.as_str(),
            kind = %error.kind,
            retryable = error.retryable,
            "{}",
            error.message
        );

        let delay = match policy.decide(attempt, &error) {
            RetryDecision::NoRetry => {
                if error.retryable {
                    tracing::warn!(
                        attempt,
                        phase = RetryPhase::Exhausted.as_str(),
                        "giving up: {}",
                        error
                    );
                }
                return Err(error);
            }
            RetryDecision::RetryAfter(d) => d,
        };

        tracing::info!(
            attempt,
            phase = RetryPhase::Retrying.as_str(),
            delay_ms = delay.as_millis() as u64,
            "retrying after {}",
            error.kind
        );
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => {
                tracing::debug!(attempt, "cancelled during backoff");
                return Err(classify(RequestError::Cancelled, context));
            }
        }
        if let Some(observer) = on_retry {
            observer(&error, attempt);
        }
        attempt += 1;
    }
}

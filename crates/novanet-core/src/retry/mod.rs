//! Retry and backoff.
//!
//! `RetryPolicy` decides whether a classified failure is retried and how long
//! to wait; `run_with_retry` drives the attempt loop on top of any async
//! operation (normally the request executor).

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_with_retry, OnRetry, RetryPhase};

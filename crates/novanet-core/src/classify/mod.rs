//! Error classifier: maps a failure to a typed, severity-tagged record.
//!
//! Deterministic apart from the record id and timestamp; the same failure
//! always yields the same kind, severity and retryability.

mod failure;
mod kind;
mod rules;

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

pub use failure::Failure;
pub use kind::{ErrorKind, Severity};

use crate::request::RequestError;

/// Classified failure. Built once per failure and not mutated afterwards.
#[derive(Debug)]
pub struct ClassifiedError {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub user_message: String,
    pub retryable: bool,
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied context such as "todos/sync".
    pub context: Option<String>,
    pub cause: Failure,
}

impl ClassifiedError {
    /// True when the failure came from the caller's cancel token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, Failure::Request(RequestError::Cancelled))
    }

    /// HTTP status of the underlying failure, if any.
    pub fn status(&self) -> Option<u16> {
        self.cause.as_request().and_then(RequestError::status)
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] {}", self.kind, self.severity, self.message)
    }
}

impl std::error::Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

const UNMATCHED: (ErrorKind, Severity, bool) = (
    ErrorKind::Unknown,
    ErrorKind::Unknown.default_severity(),
    ErrorKind::Unknown.default_retryable(),
);

/// Kind, severity and retryability of `failure` without building a record.
pub fn classify_kind(failure: &Failure) -> (ErrorKind, Severity, bool) {
    if let Some(rule) = rules::RULES.iter().find(|r| r.matches_structure(failure)) {
        return (rule.kind, rule.severity, rule.retryable);
    }
    // An HTTP answer the table has no status rule for is never guessed from its body.
    if failure.as_request().and_then(RequestError::status).is_some() {
        return UNMATCHED;
    }
    let haystack = failure.haystack();
    if let Some(rule) = rules::RULES.iter().find(|r| r.matches_text(&haystack)) {
        return (rule.kind, rule.severity, rule.retryable);
    }
    UNMATCHED
}

/// Classify a failure into a fresh `ClassifiedError`.
pub fn classify(cause: impl Into<Failure>, context: Option<&str>) -> ClassifiedError {
    let cause = cause.into();
    let (kind, severity, retryable) = classify_kind(&cause);
    ClassifiedError {
        id: Uuid::new_v4(),
        kind,
        severity,
        message: cause.to_string(),
        user_message: kind.user_message().to_string(),
        retryable,
        timestamp: Utc::now(),
        context: context.map(str::to_string),
        cause,
    }
}

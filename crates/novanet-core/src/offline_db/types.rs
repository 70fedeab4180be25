//! Rows of the offline store.

use chrono::{DateTime, Utc};

use crate::classify::{ErrorKind, Severity};
use crate::request::RequestConfig;

/// Queue row identifier.
pub type PendingId = i64;

/// A request persisted while offline, waiting to be replayed.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: PendingId,
    pub config: RequestConfig,
    pub context: Option<String>,
    /// Replay attempts that failed with a retryable error.
    pub attempts: i64,
    pub created_at: i64,
}

/// Persisted view of a `ClassifiedError` (the cause itself is not stored).
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub id: String,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub user_message: String,
    pub retryable: bool,
    pub context: Option<String>,
    pub status: Option<u16>,
    pub timestamp: DateTime<Utc>,
}

//! Failure of a single request attempt.

use thiserror::Error;

/// Error returned by one executor call (curl failure, HTTP error, timeout, cancel).
/// Kept structured so the classifier can match on status and curl error class.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The config was rejected before any network traffic.
    #[error("invalid request: {0}")]
    InvalidConfig(String),
    /// Curl reported a transport error (connect, DNS, send/recv, ...).
    #[error("transport error: {0}")]
    Transport(#[source] curl::Error),
    /// The transfer exceeded its timeout and was aborted.
    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
    /// Server answered with a non-2xx status. The body is kept for classification.
    #[error("HTTP {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: Vec<u8>,
    },
    /// Aborted through the caller's cancel token.
    #[error("request cancelled")]
    Cancelled,
    /// The blocking task driving the transfer panicked or was dropped.
    #[error("executor failure: {0}")]
    Executor(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Body of a non-2xx response, lossily decoded.
    pub fn body_text(&self) -> Option<String> {
        match self {
            RequestError::Http { body, .. } if !body.is_empty() => {
                Some(String::from_utf8_lossy(body).into_owned())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_display_includes_status_text() {
        let e = RequestError::Http {
            status: 403,
            status_text: "Forbidden".to_string(),
            body: b"nope".to_vec(),
        };
        assert_eq!(e.to_string(), "HTTP 403 Forbidden");
        assert_eq!(e.status(), Some(403));
        assert_eq!(e.body_text().as_deref(), Some("nope"));
    }

    #[test]
    fn timeout_display() {
        let e = RequestError::Timeout { after_ms: 250 };
        assert_eq!(e.to_string(), "request timed out after 250ms");
        assert!(e.status().is_none());
    }
}

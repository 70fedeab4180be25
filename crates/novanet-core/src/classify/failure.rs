//! Tagged failure type accepted by the classifier.

use thiserror::Error;

use crate::request::RequestError;

/// Any failure that can be classified: a request error, an IO error,
/// a decode error, or a free-text message.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Message(String),
}

impl Failure {
    pub fn message(msg: impl Into<String>) -> Self {
        Failure::Message(msg.into())
    }

    pub fn as_request(&self) -> Option<&RequestError> {
        match self {
            Failure::Request(e) => Some(e),
            _ => None,
        }
    }

    /// Lowercased display text the substring rules run against.
    pub(crate) fn haystack(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl From<String> for Failure {
    fn from(msg: String) -> Self {
        Failure::Message(msg)
    }
}

impl From<&str> for Failure {
    fn from(msg: &str) -> Self {
        Failure::Message(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haystack_is_lowercased_display() {
        let f = Failure::from(RequestError::Http {
            status: 400,
            status_text: "Bad Request".to_string(),
            body: b"Title is REQUIRED".to_vec(),
        });
        assert_eq!(f.haystack(), "http 400 bad request");
        assert_eq!(Failure::message("Failed to FETCH").haystack(), "failed to fetch");
    }

    #[test]
    fn message_conversions() {
        assert!(matches!(Failure::from("boom"), Failure::Message(m) if m == "boom"));
        assert_eq!(Failure::message("x").to_string(), "x");
    }
}

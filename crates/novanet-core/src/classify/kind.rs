//! Error kinds and severities with their per-kind defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Permission,
    Quota,
    Parse,
    Auth,
    System,
    Unknown,
}

/// Ordered so that `Severity::High > Severity::Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorKind {
    pub const fn default_severity(self) -> Severity {
        match self {
            ErrorKind::Validation => Severity::Low,
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Parse | ErrorKind::Unknown => {
                Severity::Medium
            }
            ErrorKind::Permission | ErrorKind::Quota | ErrorKind::Auth => Severity::High,
            ErrorKind::System => Severity::Critical,
        }
    }

    pub const fn default_retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::System)
    }

    /// Suggested display string for end users.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Network => "Unable to connect. Please check your internet connection.",
            ErrorKind::Timeout => "The request took too long. Please try again.",
            ErrorKind::Validation => "Some of the information provided is invalid.",
            ErrorKind::Permission => "You don't have permission to perform this action.",
            ErrorKind::Quota => "Storage or usage limit reached. Free up space or try again later.",
            ErrorKind::Parse => "Received data could not be read.",
            ErrorKind::Auth => "Please sign in again to continue.",
            ErrorKind::System => "Something went wrong on our side. Please try again.",
            ErrorKind::Unknown => "An unexpected error occurred.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Validation => "validation",
            ErrorKind::Permission => "permission",
            ErrorKind::Quota => "quota",
            ErrorKind::Parse => "parse",
            ErrorKind::Auth => "auth",
            ErrorKind::System => "system",
            ErrorKind::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "network" => ErrorKind::Network,
            "timeout" => ErrorKind::Timeout,
            "validation" => ErrorKind::Validation,
            "permission" => ErrorKind::Permission,
            "quota" => ErrorKind::Quota,
            "parse" => ErrorKind::Parse,
            "auth" => ErrorKind::Auth,
            "system" => ErrorKind::System,
            _ => ErrorKind::Unknown,
        }
    }
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "low" => Severity::Low,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Medium,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

//! Ordered classification rules.
//!
//! Each rule may match structurally (HTTP status, curl/io error class,
//! failure variant) and/or by lowercase substring of the failure text.
//! Structural matches are checked across the whole table first, then
//! substrings; within each pass the first matching rule wins.

use std::io;

use super::{ErrorKind, Failure, Severity};
use crate::request::RequestError;

pub(crate) struct Rule {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub retryable: bool,
    pub statuses: &'static [u16],
    pub status_range: Option<(u16, u16)>,
    pub structural: Option<fn(&Failure) -> bool>,
    pub patterns: &'static [&'static str],
}

impl Rule {
    /// Rule with the kind's default severity and retryability.
    const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            retryable: kind.default_retryable(),
            statuses: &[],
            status_range: None,
            structural: None,
            patterns: &[],
        }
    }

    const fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    const fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    const fn statuses(mut self, statuses: &'static [u16]) -> Self {
        self.statuses = statuses;
        self
    }

    const fn status_range(mut self, lo: u16, hi: u16) -> Self {
        self.status_range = Some((lo, hi));
        self
    }

    const fn structural(mut self, f: fn(&Failure) -> bool) -> Self {
        self.structural = Some(f);
        self
    }

    const fn patterns(mut self, patterns: &'static [&'static str]) -> Self {
        self.patterns = patterns;
        self
    }

    pub(crate) fn matches_structure(&self, failure: &Failure) -> bool {
        if let Some(status) = failure.as_request().and_then(RequestError::status) {
            if self.statuses.contains(&status) {
                return true;
            }
            if let Some((lo, hi)) = self.status_range {
                if (lo..=hi).contains(&status) {
                    return true;
                }
            }
        }
        self.structural.map(|f| f(failure)).unwrap_or(false)
    }

    pub(crate) fn matches_text(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|p| haystack.contains(p))
    }
}

fn is_cancelled(f: &Failure) -> bool {
    matches!(f, Failure::Request(RequestError::Cancelled))
}

fn is_network(f: &Failure) -> bool {
    match f {
        Failure::Request(RequestError::Transport(e)) => {
            e.is_couldnt_connect()
                || e.is_couldnt_resolve_host()
                || e.is_couldnt_resolve_proxy()
                || e.is_read_error()
                || e.is_recv_error()
                || e.is_send_error()
                || e.is_got_nothing()
        }
        Failure::Io(e) => matches!(
            e.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::AddrNotAvailable
                | io::ErrorKind::BrokenPipe
        ),
        _ => false,
    }
}

fn is_timeout(f: &Failure) -> bool {
    match f {
        Failure::Request(RequestError::Timeout { .. }) => true,
        Failure::Request(RequestError::Transport(e)) => e.is_operation_timedout(),
        Failure::Io(e) => e.kind() == io::ErrorKind::TimedOut,
        _ => false,
    }
}

fn is_permission(f: &Failure) -> bool {
    matches!(f, Failure::Io(e) if e.kind() == io::ErrorKind::PermissionDenied)
}

fn is_validation(f: &Failure) -> bool {
    match f {
        Failure::Request(RequestError::InvalidConfig(_)) => true,
        Failure::Io(e) => e.kind() == io::ErrorKind::InvalidInput,
        _ => false,
    }
}

fn is_parse(f: &Failure) -> bool {
    match f {
        Failure::Parse(_) => true,
        Failure::Io(e) => e.kind() == io::ErrorKind::InvalidData,
        _ => false,
    }
}

pub(crate) static RULES: &[Rule] = &[
    Rule::new(ErrorKind::Unknown)
        .severity(Severity::Low)
        .structural(is_cancelled),
    Rule::new(ErrorKind::Network)
        .structural(is_network)
        .patterns(&["fetch", "network", "connection", "offline", "dns"]),
    Rule::new(ErrorKind::Timeout)
        .statuses(&[408, 504])
        .structural(is_timeout)
        .patterns(&["timeout", "timed out"]),
    Rule::new(ErrorKind::Auth)
        .statuses(&[401])
        .patterns(&["401", "unauthorized", "unauthenticated", "authentication", "token expired"]),
    Rule::new(ErrorKind::Permission)
        .statuses(&[403])
        .structural(is_permission)
        .patterns(&["403", "forbidden", "permission", "access denied"]),
    // Rate limiting clears by itself, unlike an exhausted quota.
    Rule::new(ErrorKind::Quota)
        .severity(Severity::Medium)
        .retryable(true)
        .statuses(&[429])
        .patterns(&["too many requests", "rate limit"]),
    Rule::new(ErrorKind::Quota)
        .statuses(&[413])
        .patterns(&["quota", "storage full", "disk full"]),
    Rule::new(ErrorKind::Validation)
        .statuses(&[400, 422])
        .structural(is_validation)
        .patterns(&["validation", "invalid", "required"]),
    Rule::new(ErrorKind::Parse)
        .structural(is_parse)
        .patterns(&["json", "parse", "syntax", "unexpected token"]),
    // A 5xx answer means the server is up; only free-text system failures are Critical.
    Rule::new(ErrorKind::System)
        .severity(Severity::High)
        .status_range(500, 599),
    Rule::new(ErrorKind::System).patterns(&["internal server", "server error", "system"]),
];

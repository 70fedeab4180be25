//! Liveness probing: a cheap HEAD request whose round-trip time is reported.

use std::time::{Duration, Instant};

use crate::control::CancelToken;
use crate::request::{execute_blocking, Method, RequestConfig, RequestError};

/// Something that can tell whether the network is reachable.
///
/// Called from the blocking pool, so implementations may block.
pub trait LivenessProbe: Send + Sync + 'static {
    /// Round-trip time on success.
    fn probe(&self, cancel: &CancelToken) -> Result<Duration, RequestError>;
}

/// HEAD request against a fixed URL, single attempt.
#[derive(Debug, Clone)]
pub struct HeadProbe {
    pub url: String,
    pub timeout_ms: u64,
}

impl HeadProbe {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            timeout_ms,
        }
    }
}

impl LivenessProbe for HeadProbe {
    fn probe(&self, cancel: &CancelToken) -> Result<Duration, RequestError> {
        let config = RequestConfig::get(self.url.clone())
            .with_method(Method::Head)
            .with_header("Cache-Control", "no-cache")
            .with_timeout_ms(self.timeout_ms)
            .with_max_retries(1);
        let started = Instant::now();
        match execute_blocking(&config, cancel) {
            // Any HTTP status means the host answered.
            Ok(_) | Err(RequestError::Http { .. }) => Ok(started.elapsed()),
            Err(e) => Err(e),
        }
    }
}

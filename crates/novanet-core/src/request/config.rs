//! Per-call request configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::RequestError;
use crate::retry::RetryPolicy;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "HEAD" => Some(Method::Head),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Everything needed to issue (and retry) one logical request.
///
/// Built fresh by the caller for every call. Serializable so the offline
/// queue can persist it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub url: String,
    #[serde(default)]
    pub method: Method,
    /// Header pairs in send order. Names are not normalized.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<u8>>,
    pub timeout_ms: u64,
    /// Maximum number of attempts, including the first.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub use_exponential_backoff: bool,
}

impl RequestConfig {
    /// GET request with built-in defaults.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            use_exponential_backoff: true,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, base_delay_ms: u64, max_delay_ms: u64, exponential: bool) -> Self {
        self.base_delay_ms = base_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self.use_exponential_backoff = exponential;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry policy for this call. Factor and jitter come from `base`; the
    /// per-call fields override the rest.
    pub fn retry_policy(&self, base: &RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            exponential: self.use_exponential_backoff,
            ..*base
        }
    }

    /// Reject configs that can never succeed before any network traffic.
    pub fn validate(&self) -> Result<(), RequestError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| RequestError::InvalidConfig(format!("invalid url {:?}: {}", self.url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(RequestError::InvalidConfig(format!(
                "unsupported scheme {:?}",
                parsed.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(RequestError::InvalidConfig("timeout_ms must be > 0".to_string()));
        }
        if self.max_retries == 0 {
            return Err(RequestError::InvalidConfig("max_retries must be at least 1".to_string()));
        }
        for (name, _) in &self.headers {
            if name.trim().is_empty() || name.contains(':') {
                return Err(RequestError::InvalidConfig(format!("invalid header name {:?}", name)));
            }
        }
        Ok(())
    }
}

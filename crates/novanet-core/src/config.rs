use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::request::{self, RequestConfig};
use crate::retry::RetryPolicy;

/// Defaults applied to every request built from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: request::DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Retry policy parameters (`[retry]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_factor: f64,
    pub use_exponential_backoff: bool,
    #[serde(default = "default_true")]
    pub jitter: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: request::DEFAULT_MAX_RETRIES,
            base_delay_ms: request::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: request::DEFAULT_MAX_DELAY_MS,
            backoff_factor: 2.0,
            use_exponential_backoff: true,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_factor: self.backoff_factor,
            exponential: self.use_exponential_backoff,
            jitter: self.jitter,
        }
    }
}

/// Connectivity monitor parameters (`[connectivity]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// URL hit with a HEAD request by the liveness probe.
    pub probe_url: String,
    pub probe_interval_secs: u64,
    pub probe_timeout_ms: u64,
    /// Online/offline signals inside this window collapse into the last one.
    pub debounce_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_url: "https://www.google.com/generate_204".to_string(),
            probe_interval_secs: 30,
            probe_timeout_ms: 5_000,
            debounce_ms: 1_000,
        }
    }
}

impl ConnectivityConfig {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Global configuration loaded from `~/.config/novanet/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NovaConfig {
    #[serde(default)]
    pub request: RequestDefaults,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    /// Error log entries kept after pruning (None = built-in default).
    #[serde(default)]
    pub max_logged_errors: Option<u32>,
}

pub const DEFAULT_MAX_LOGGED_ERRORS: u32 = 100;

impl NovaConfig {
    /// GET request for `url` with timeout and retry fields taken from this config.
    pub fn request(&self, url: impl Into<String>) -> RequestConfig {
        RequestConfig::get(url)
            .with_timeout_ms(self.request.timeout_ms)
            .with_max_retries(self.retry.max_retries)
            .with_backoff(
                self.retry.base_delay_ms,
                self.retry.max_delay_ms,
                self.retry.use_exponential_backoff,
            )
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_retries == 0 {
            bail!("retry.max_retries must be at least 1");
        }
        if self.request.timeout_ms == 0 {
            bail!("request.timeout_ms must be > 0");
        }
        Ok(())
    }

    pub fn max_logged_errors(&self) -> u32 {
        self.max_logged_errors.unwrap_or(DEFAULT_MAX_LOGGED_ERRORS)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("novanet")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default path, creating a default file if none exists.
pub fn load_or_init() -> Result<NovaConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<NovaConfig> {
    if !path.exists() {
        let default_cfg = NovaConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: NovaConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

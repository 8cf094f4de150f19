//! Runtime configuration
//!
//! Configuration is plain structs with sensible defaults, overridable from the
//! environment. The cache switch is special: it is re-read on every cache
//! operation rather than captured once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Public Tesouro Direto catalog endpoint
pub const DEFAULT_API_URL: &str =
    "https://www.tesourodireto.com.br/json/br/com/b3/tesourodireto/service/api/treasurybondsinfo.json";

/// Default upstream request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Overrides the catalog endpoint
pub const API_URL_ENV: &str = "TESOURO_API_URL";

/// Overrides the request timeout (whole seconds)
pub const TIMEOUT_ENV: &str = "TESOURO_TIMEOUT_SECS";

/// Set to `true` to bypass the snapshot cache
pub const CACHE_DISABLED_ENV: &str = "MCP_CACHE_DISABLED";

/// Errors raised while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Timeout was not a positive whole number of seconds
    #[error("Invalid timeout: '{0}'. Expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Settings for the upstream HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog endpoint
    pub api_url: String,
    /// Per-request timeout, covering connect and body read
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Builds a config from defaults plus `TESOURO_API_URL` / `TESOURO_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            config.timeout = parse_timeout_secs(&raw)?;
        }
        Ok(config)
    }
}

/// Parses a timeout given in whole seconds
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

/// Whether the snapshot cache is in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheSwitch {
    /// Read `MCP_CACHE_DISABLED` on every call
    #[default]
    FromEnv,
    /// Always cache
    Enabled,
    /// Never cache
    Disabled,
}

impl CacheSwitch {
    /// Resolves the switch for the current call
    pub fn is_enabled(self) -> bool {
        match self {
            CacheSwitch::FromEnv => cache_enabled_from(env::var(CACHE_DISABLED_ENV).ok().as_deref()),
            CacheSwitch::Enabled => true,
            CacheSwitch::Disabled => false,
        }
    }
}

/// Interprets the raw value of `MCP_CACHE_DISABLED`; only the literal `true` disables
pub fn cache_enabled_from(value: Option<&str>) -> bool {
    value != Some("true")
}

/// Where log output goes and how verbose it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level directive (trace, debug, info, warn, error)
    pub level: String,
    /// Log file; `None` logs to stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

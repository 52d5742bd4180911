//! Configuration management for visitplan
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every section has defaults, so a file only needs
//! the values it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Batch synchronization settings
    pub sync: SyncConfig,

    /// Remote record store settings
    pub store: StoreConfig,

    /// Schedule generation settings
    pub planning: PlanningConfig,

    /// Holiday calendar settings
    pub calendar: CalendarConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Batch synchronizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Operations in flight per chunk
    pub concurrency: usize,

    /// Pause between chunks in milliseconds
    pub batch_delay_ms: u64,

    /// Retries per item after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,

    /// Cap for a single backoff delay in milliseconds
    pub retry_max_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            batch_delay_ms: 0,
            max_retries: 2,
            retry_base_delay_ms: 500,
            retry_max_delay_ms: 30_000,
        }
    }
}

/// Remote record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the record API
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Bearer token passed through to the store
    pub api_token: Option<String>,

    /// Requests per second; fractions such as 0.5 space requests further apart
    pub rate_limit: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8080/api"),
            request_timeout_secs: 30,
            api_token: None,
            rate_limit: 10.0,
        }
    }
}

/// Schedule generation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Candidates per working day
    pub shops_per_day: u32,

    /// Groups per working day
    pub groups_per_day: u32,

    /// Keep restricted-transit candidates
    pub include_restricted: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            shops_per_day: 9,
            groups_per_day: 3,
            include_restricted: true,
        }
    }
}

/// Holiday calendar configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// JSON holiday table; the bundled Hong Kong table is used when unset
    pub holidays_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let sync = SyncConfig {
            concurrency: env_parse("VISITPLAN_CONCURRENCY").unwrap_or(defaults.sync.concurrency),
            batch_delay_ms: env_parse("VISITPLAN_BATCH_DELAY_MS")
                .unwrap_or(defaults.sync.batch_delay_ms),
            max_retries: env_parse("VISITPLAN_MAX_RETRIES").unwrap_or(defaults.sync.max_retries),
            retry_base_delay_ms: env_parse("VISITPLAN_RETRY_BASE_DELAY_MS")
                .unwrap_or(defaults.sync.retry_base_delay_ms),
            retry_max_delay_ms: env_parse("VISITPLAN_RETRY_MAX_DELAY_MS")
                .unwrap_or(defaults.sync.retry_max_delay_ms),
        };

        let store = StoreConfig {
            base_url: std::env::var("VISITPLAN_STORE_URL").unwrap_or(defaults.store.base_url),
            request_timeout_secs: env_parse("VISITPLAN_REQUEST_TIMEOUT")
                .unwrap_or(defaults.store.request_timeout_secs),
            api_token: std::env::var("VISITPLAN_API_TOKEN").ok(),
            rate_limit: env_parse("VISITPLAN_RATE_LIMIT").unwrap_or(defaults.store.rate_limit),
        };

        let planning = PlanningConfig {
            shops_per_day: env_parse("VISITPLAN_SHOPS_PER_DAY")
                .unwrap_or(defaults.planning.shops_per_day),
            groups_per_day: env_parse("VISITPLAN_GROUPS_PER_DAY")
                .unwrap_or(defaults.planning.groups_per_day),
            include_restricted: env_parse("VISITPLAN_INCLUDE_RESTRICTED")
                .unwrap_or(defaults.planning.include_restricted),
        };

        let calendar = CalendarConfig {
            holidays_path: std::env::var("VISITPLAN_HOLIDAYS_PATH").ok().map(PathBuf::from),
        };

        let logging = LoggingConfig {
            level: std::env::var("VISITPLAN_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("VISITPLAN_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            sync,
            store,
            planning,
            calendar,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sync.concurrency == 0 {
            anyhow::bail!("sync.concurrency must be greater than 0");
        }

        if self.sync.retry_max_delay_ms < self.sync.retry_base_delay_ms {
            anyhow::bail!("sync.retry_max_delay_ms must not be below retry_base_delay_ms");
        }

        if self.planning.shops_per_day == 0 {
            anyhow::bail!("planning.shops_per_day must be greater than 0");
        }

        if self.planning.groups_per_day == 0 {
            anyhow::bail!("planning.groups_per_day must be greater than 0");
        }

        if !self.store.rate_limit.is_finite() || self.store.rate_limit <= 0.0 {
            anyhow::bail!("store.rate_limit must be positive");
        }

        url::Url::parse(&self.store.base_url)
            .with_context(|| format!("store.base_url is not a valid URL: {}", self.store.base_url))?;

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.store.request_timeout_secs)
    }
}

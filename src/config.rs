//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The bot token is referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`. Everything is immutable once
//! loaded.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::history::DEFAULT_CAPACITY;
use crate::strategy::timing::{DEFAULT_DEADLINE_SECS, DEFAULT_ROUND_SECS, MAX_ROUND_SECS};
use crate::types::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_round_duration")]
    pub round_duration_secs: u64,
    /// Signals must go out at least this many seconds before the round closes.
    #[serde(default = "default_signal_deadline")]
    pub signal_deadline_secs: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            round_duration_secs: default_round_duration(),
            signal_deadline_secs: default_signal_deadline(),
            history_capacity: default_history_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Latest-round endpoint. Defaults to the public CasinoScores feed.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_token_env")]
    pub bot_token_env: String,
    pub chat_id: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Answer `/start` by long-polling `getUpdates`.
    #[serde(default = "default_listen_commands")]
    pub listen_commands: bool,
}

fn default_poll_interval() -> u64 {
    5
}

fn default_round_duration() -> u64 {
    DEFAULT_ROUND_SECS
}

fn default_signal_deadline() -> u64 {
    DEFAULT_DEADLINE_SECS
}

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_timeout() -> u64 {
    5
}

fn default_catalog_path() -> String {
    crate::storage::DEFAULT_CATALOG_FILE.to_string()
}

fn default_listen_commands() -> bool {
    true
}

fn default_token_env() -> String {
    "TELEGRAM_TOKEN".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.monitor;
        if m.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if m.history_capacity == 0 {
            return Err(ConfigError::ZeroHistoryCapacity);
        }
        if m.round_duration_secs > MAX_ROUND_SECS {
            return Err(ConfigError::RoundTooLong {
                duration: m.round_duration_secs,
                max: MAX_ROUND_SECS,
            });
        }
        if m.signal_deadline_secs >= m.round_duration_secs {
            return Err(ConfigError::DeadlineTooLong {
                deadline: m.signal_deadline_secs,
                duration: m.round_duration_secs,
            });
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(ConfigError::MissingDestination);
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.poll_interval_secs)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram.timeout_secs)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

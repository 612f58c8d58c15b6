use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::live::DEFAULT_STALE_AFTER_SECS;
use crate::logs::{DEFAULT_LOG_CAPACITY, DEFAULT_LOG_RETAIN};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Build string served by `/__version` and shown on the admin page.
    #[serde(default = "default_version")]
    pub version: String,
}

/// In-memory store limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Log entries held before a batch trim.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Log entries kept by a batch trim.
    #[serde(default = "default_log_retain")]
    pub log_retain: usize,
    /// Age in seconds past which the live link is stale.
    #[serde(default = "default_live_stale_secs")]
    pub live_stale_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5055
}

fn default_version() -> String {
    format!("mirror-console {}", env!("CARGO_PKG_VERSION"))
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_log_retain() -> usize {
    DEFAULT_LOG_RETAIN
}

fn default_live_stale_secs() -> u64 {
    DEFAULT_STALE_AFTER_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            version: default_version(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            log_retain: default_log_retain(),
            live_stale_secs: default_live_stale_secs(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_retain == 0 {
            anyhow::bail!("store.log_retain must be positive");
        }
        if self.log_retain >= self.log_capacity {
            anyhow::bail!(
                "store.log_retain ({}) must be below store.log_capacity ({})",
                self.log_retain,
                self.log_capacity
            );
        }
        if self.live_stale_secs == 0 {
            anyhow::bail!("store.live_stale_secs must be positive");
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Load config from `path`, or fall back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()
    }
}

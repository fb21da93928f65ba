//! Application configuration.
//!
//! Loaded from `config.json` in the platform config directory, then
//! overridden by environment variables:
//! - `QUOTEBOOK_REMOTE_URL` - Base URL of the posts endpoint
//! - `QUOTEBOOK_FETCH_LIMIT` - Number of posts pulled per sync
//! - `QUOTEBOOK_SYNC_INTERVAL_SECS` - Period of the background sync
//! - `QUOTEBOOK_TIMEOUT_SECS` - Remote request timeout
//! - `QUOTEBOOK_DATA_DIR` - Directory holding `quotebook.db`

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "quotebook";
const CONFIG_FILE: &str = "config.json";

/// Default remote, a public mock REST API.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the remote posts endpoint (without `/posts`).
    pub remote_url: String,
    /// How many posts one sync pulls.
    pub fetch_limit: usize,
    /// Seconds between background syncs.
    pub sync_interval_secs: u64,
    /// Seconds before a remote request is abandoned.
    pub request_timeout_secs: u64,
    /// Seconds a status message stays visible.
    pub status_clear_secs: u64,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            fetch_limit: 5,
            sync_interval_secs: 30,
            request_timeout_secs: 10,
            status_clear_secs: 5,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let config = match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config file")
    }

    /// Apply overrides from a variable lookup. Unparseable numbers are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("QUOTEBOOK_REMOTE_URL") {
            self.remote_url = url;
        }
        if let Some(limit) = lookup("QUOTEBOOK_FETCH_LIMIT").and_then(|s| s.parse().ok()) {
            self.fetch_limit = limit;
        }
        if let Some(secs) = lookup("QUOTEBOOK_SYNC_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
            self.sync_interval_secs = secs;
        }
        if let Some(secs) = lookup("QUOTEBOOK_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(dir) = lookup("QUOTEBOOK_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(config_path)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn status_clear_after(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }

    /// Database location: `data_dir` if set, else `None` for the platform default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("quotebook.db"))
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

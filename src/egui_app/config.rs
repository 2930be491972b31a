//! Desktop client configuration loading.
//!
//! Precedence, lowest first: built-in defaults, the TOML file named by
//! `OPENFIELD_CONFIG`, then individual `OPENFIELD_*` variables. A `.env` file
//! is read first and never overrides variables already set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError, ConfigFile, FacilityOption};

pub const CONFIG_PATH_ENV: &str = "OPENFIELD_CONFIG";
pub const SYNC_URL_ENV: &str = "OPENFIELD_SYNC_URL";
pub const QUEUE_KEY_ENV: &str = "OPENFIELD_QUEUE_KEY";
pub const SYNC_CENTER_URL_ENV: &str = "OPENFIELD_SYNC_CENTER_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "OPENFIELD_REQUEST_TIMEOUT_SECS";
pub const LOCAL_DB_ENV: &str = "OPENFIELD_LOCAL_DB";

/// Application configuration wrapper.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// File the configuration was read from, if any
    pub source_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
            source_file: None,
        }
    }
}

impl Config {
    /// Load from `.env`, the config file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_sources(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` for environment variables
    pub fn from_sources(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source_file = lookup(CONFIG_PATH_ENV)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let mut builder = match &source_file {
            Some(path) => AppConfigBuilder::from_file(read_config_file(path)?),
            None => AppConfigBuilder::default(),
        };

        if let Some(url) = lookup(SYNC_URL_ENV) {
            builder = builder.sync_url(url);
        }
        if let Some(key) = lookup(QUEUE_KEY_ENV) {
            builder = builder.queue_key(key);
        }
        if let Some(url) = lookup(SYNC_CENTER_URL_ENV) {
            builder = builder.sync_center_url(url);
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("{} must be a number of seconds", REQUEST_TIMEOUT_ENV)))?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = lookup(LOCAL_DB_ENV).filter(|path| !path.trim().is_empty()) {
            builder = builder.local_db_path(path);
        }

        let app = builder.build()?;
        tracing::info!(
            offline_enabled = app.offline_enabled(),
            queue_key = %app.queue_key,
            "Configuration loaded"
        );
        Ok(Self { app, source_file })
    }

    /// Whether the offline queue and sync center are active
    pub fn offline_enabled(&self) -> bool {
        self.app.offline_enabled()
    }

    pub fn sync_url(&self) -> Option<&Url> {
        self.app.sync_url.as_ref()
    }

    pub fn sync_center_url(&self) -> Option<&Url> {
        self.app.sync_center_url.as_ref()
    }

    pub fn facilities(&self) -> &[FacilityOption] {
        &self.app.facilities
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigFile::parse(&source)
}

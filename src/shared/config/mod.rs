//! Application configuration module
//!
//! Validated configuration for the offline submission subsystem. Values come
//! from defaults, an optional TOML file and environment variables (see
//! `egui_app::config` for the loading order); this module only models and
//! validates them.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Queue identity used when none is configured
pub const DEFAULT_QUEUE_KEY: &str = "default";

/// Upper bound for a single delivery attempt
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Period of the connectivity probe
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(15);

/// A selectable facility (value + display label)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacilityOption {
    pub id: String,
    pub label: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ingest endpoint; `None` disables the offline subsystem
    pub sync_url: Option<Url>,
    /// Queue identity
    pub queue_key: String,
    /// Optional link rendered in the sync center
    pub sync_center_url: Option<Url>,
    pub request_timeout: Duration,
    pub probe_interval: Duration,
    /// Overrides the platform data directory for the local queue database
    pub local_db_path: Option<PathBuf>,
    pub facilities: Vec<FacilityOption>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sync_url: None,
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
            sync_center_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            local_db_path: None,
            facilities: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Whether the offline queue, sync engine and sync center are active
    pub fn offline_enabled(&self) -> bool {
        self.sync_url.is_some()
    }
}

/// Raw, unvalidated values as they appear in a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub sync_url: Option<String>,
    pub queue_key: Option<String>,
    pub sync_center_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub probe_interval_secs: Option<u64>,
    pub local_db_path: Option<PathBuf>,
    pub facilities: Vec<FacilityOption>,
}

impl ConfigFile {
    /// Parse a TOML document
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    sync_url: Option<String>,
    queue_key: Option<String>,
    sync_center_url: Option<String>,
    request_timeout: Option<Duration>,
    probe_interval: Option<Duration>,
    local_db_path: Option<PathBuf>,
    facilities: Vec<FacilityOption>,
}

impl AppConfigBuilder {
    /// Start from the values of a config file
    pub fn from_file(file: ConfigFile) -> Self {
        Self {
            sync_url: file.sync_url,
            queue_key: file.queue_key,
            sync_center_url: file.sync_center_url,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            probe_interval: file.probe_interval_secs.map(Duration::from_secs),
            local_db_path: file.local_db_path,
            facilities: file.facilities,
        }
    }

    /// Set the ingest endpoint URL
    pub fn sync_url(mut self, url: impl Into<String>) -> Self {
        self.sync_url = Some(url.into());
        self
    }

    /// Set the queue identity
    pub fn queue_key(mut self, key: impl Into<String>) -> Self {
        self.queue_key = Some(key.into());
        self
    }

    /// Set the sync center link
    pub fn sync_center_url(mut self, url: impl Into<String>) -> Self {
        self.sync_center_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = Some(interval);
        self
    }

    pub fn local_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_db_path = Some(path.into());
        self
    }

    pub fn facility(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.facilities.push(FacilityOption {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let sync_url = parse_optional_url(self.sync_url)?;
        let sync_center_url = parse_optional_url(self.sync_center_url)?;

        let queue_key = match self.queue_key.map(|key| key.trim().to_string()) {
            None => DEFAULT_QUEUE_KEY.to_string(),
            Some(key) if key.is_empty() => DEFAULT_QUEUE_KEY.to_string(),
            Some(key) if key.chars().any(char::is_control) => {
                return Err(ConfigError::InvalidQueueKey(key));
            }
            Some(key) => key,
        };

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout.is_zero() {
            return Err(ConfigError::MissingValue("request_timeout"));
        }

        Ok(AppConfig {
            sync_url,
            queue_key,
            sync_center_url,
            request_timeout,
            probe_interval: self.probe_interval.unwrap_or(DEFAULT_PROBE_INTERVAL),
            local_db_path: self.local_db_path,
            facilities: self.facilities,
        })
    }
}

fn parse_optional_url(raw: Option<String>) -> Result<Option<Url>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            let url = Url::parse(value).map_err(|_| ConfigError::InvalidUrl(value.to_string()))?;
            match url.scheme() {
                "http" | "https" => Ok(Some(url)),
                _ => Err(ConfigError::InvalidUrl(value.to_string())),
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("invalid queue key: {0:?}")]
    InvalidQueueKey(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("config file error: {0}")]
    Parse(String),
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

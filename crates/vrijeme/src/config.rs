//! YAML configuration for a city poller.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::feed::{CROATIA_URL, FETCH_TIMEOUT};

/// Default refresh interval in seconds.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 3600;

/// Poller configuration.
///
/// ```yaml
/// city: Zagreb-Grič
/// update_interval: 1800
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// City name exactly as spelled in the feed
    pub city: String,

    /// Seconds between scheduled refreshes
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Feed URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Fetch timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL
}

fn default_url() -> String {
    CROATIA_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    FETCH_TIMEOUT.as_secs()
}

impl Config {
    /// Configuration for `city` with every other field at its default.
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.city = config.city.trim().to_string();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.city.is_empty() {
            return Err(ConfigError::Invalid("city must not be empty".to_string()));
        }
        if self.update_interval == 0 {
            return Err(ConfigError::Invalid(
                "update_interval must be a positive number of seconds".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be a positive number of seconds".to_string(),
            ));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "url must be http(s), got {}",
                self.url
            )));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

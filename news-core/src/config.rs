use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "news-reader";

pub const ENV_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_BASE_URL: &str = "NEWS_API_BASE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub page_len: usize,
    pub refresh_interval_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for stored values; the config directory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/top-headlines?country=us".to_owned(),
            api_key: String::new(),
            page_size: 100,
            request_timeout_seconds: 10,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_len: 10,
            refresh_interval_seconds: 10,
        }
    }
}

impl ApiConfig {
    pub fn url(&self) -> Result<Url, ConfigError> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl FeedConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

impl AppConfig {
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR))
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join("config.json"))
    }

    /// Loads the config file, falling back to (and trying to save) defaults,
    /// then applies environment overrides.
    pub fn load() -> Self {
        let config = match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "could not load config, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save() {
                    warn!(error = %save_err, "could not save default config");
                }
                default_config
            }
        };
        config.with_overrides(|name| std::env::var(name).ok())
    }

    fn load_from_file() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_file_path()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replaces the endpoint and key with values from `lookup` when present.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api.api_key = key;
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.url()?;
        if self.api.page_size == 0 {
            return Err(ConfigError::Invalid("api.page_size must be positive".into()));
        }
        if self.feed.page_len == 0 {
            return Err(ConfigError::Invalid("feed.page_len must be positive".into()));
        }
        if self.feed.refresh_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "feed.refresh_interval_seconds must be positive".into(),
            ));
        }
        Ok(())
    }
}

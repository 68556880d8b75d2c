//! Configuration types and loading
//!
//! The console is bootstrapped with the REST base URL and the notification
//! socket URL. Values are layered: built-in defaults, an optional config
//! file, `BC_`-prefixed nested environment keys, then the flat variables
//! read by [`ConsoleConfig::apply_env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConsoleError;
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Main console configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConsoleConfig {
    /// REST API configuration
    pub api: ApiConfig,

    /// Push notification configuration
    pub notifications: NotificationConfig,

    /// Paging defaults
    pub paging: PagingConfig,

    /// Where UI preferences are persisted
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    /// Falls back to the HTTP client default when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NotificationConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PagingConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080/pnc-rest/v2".to_string(),
                token: None,
                timeout_seconds: None,
            },
            notifications: NotificationConfig {
                url: "ws://localhost:8080/pnc-rest/v2/notifications".to_string(),
            },
            paging: PagingConfig {
                default_page_size: DEFAULT_PAGE_SIZE,
                max_page_size: MAX_PAGE_SIZE,
            },
            preferences_path: None,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("Config file error: {0}")]
    FileError(String),
}

impl From<ConfigError> for ConsoleError {
    fn from(err: ConfigError) -> Self {
        ConsoleError::Config(err.to_string())
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::FileError(err.to_string())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl ConsoleConfig {
    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then an optional file (TOML/YAML/JSON by extension), then environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BC")
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: ConsoleConfig = builder.build()?.try_deserialize()?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the flat `BC_*` variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("BC_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(token) = std::env::var("BC_API_TOKEN") {
            self.api.token = if token.is_empty() { None } else { Some(token) };
        }
        if let Ok(timeout) = std::env::var("BC_API_TIMEOUT_SECONDS") {
            self.api.timeout_seconds = Some(parse_env("BC_API_TIMEOUT_SECONDS", timeout)?);
        }
        if let Ok(url) = std::env::var("BC_NOTIFICATIONS_URL") {
            self.notifications.url = url;
        }
        if let Ok(size) = std::env::var("BC_PAGE_SIZE") {
            self.paging.default_page_size = parse_env("BC_PAGE_SIZE", size)?;
        }
        if let Ok(path) = std::env::var("BC_PREFERENCES_PATH") {
            self.preferences_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Check URLs parse and page sizes are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = Url::parse(&self.api.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "api.base_url".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(api.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "api.base_url".to_string(),
                message: format!("unsupported scheme {}", api.scheme()),
            });
        }

        let socket = Url::parse(&self.notifications.url).map_err(|e| ConfigError::InvalidValue {
            key: "notifications.url".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(socket.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                key: "notifications.url".to_string(),
                message: format!("unsupported scheme {}", socket.scheme()),
            });
        }

        if self.paging.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "paging.max_page_size".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.paging.default_page_size == 0
            || self.paging.default_page_size > self.paging.max_page_size
        {
            return Err(ConfigError::InvalidValue {
                key: "paging.default_page_size".to_string(),
                message: format!("must be between 1 and {}", self.paging.max_page_size),
            });
        }
        Ok(())
    }

    /// API base URL with a trailing slash, ready for `Url::join`
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
            key: "api.base_url".to_string(),
            message: e.to_string(),
        })
    }
}

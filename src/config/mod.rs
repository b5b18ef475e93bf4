//! Application settings.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::ShippingOption;
use crate::scrapers::USER_AGENT;

/// Marketplace site scraped for the category taxonomy.
pub const DEFAULT_BASE_URL: &str = "https://www.marktplaats.nl";

/// Default category cache duration in days.
pub const DEFAULT_CACHE_DAYS: u64 = 7;

/// User-editable bounds for the cache duration, in days.
pub const MIN_CACHE_DAYS: u64 = 1;
pub const MAX_CACHE_DAYS: u64 = 30;

/// Config file name looked up in the working directory.
const LOCAL_CONFIG_FILENAME: &str = "marktsync.toml";

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Marketplace base URL.
    pub base_url: String,
    /// User agent presented on outbound requests.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Category cache duration in days. Doubles as the refresh interval,
    /// clamped to [MIN_CACHE_DAYS, MAX_CACHE_DAYS] at load time.
    pub category_cache_days: u64,
    /// Text prepended to every listing description.
    pub description_prefix: String,
    /// Text appended to every listing description.
    pub description_suffix: String,
    /// Shipping arrangement used when the product does not specify one.
    pub default_shipping: ShippingOption,
    /// Marketplace account name. Also settable via MARKTSYNC_USERNAME.
    pub username: Option<String>,
    /// Marketplace account password. Also settable via MARKTSYNC_PASSWORD.
    pub password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: crate::scrapers::http_client::DEFAULT_TIMEOUT_SECS,
            category_cache_days: DEFAULT_CACHE_DAYS,
            description_prefix: String::new(),
            description_suffix: String::new(),
            default_shipping: ShippingOption::default(),
            username: None,
            password: None,
        }
    }
}

impl Settings {
    /// Load settings from the given path, the working directory, or the user
    /// config directory, in that order. Missing files mean defaults;
    /// credentials from the environment win over the file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match Self::resolve_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides();
        settings.clamp_cache_days();
        Ok(settings)
    }

    /// Parse settings from TOML text. Cache bounds are applied here too.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let mut settings: Settings = toml::from_str(raw)?;
        settings.clamp_cache_days();
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings: Settings =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        settings.clamp_cache_days();
        Ok(settings)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILENAME);
        if local.exists() {
            return Some(local);
        }

        let user = dirs::config_dir()?.join("marktsync").join("config.toml");
        user.exists().then_some(user)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var("MARKTSYNC_USERNAME") {
            if !username.is_empty() {
                self.username = Some(username);
            }
        }
        if let Ok(password) = std::env::var("MARKTSYNC_PASSWORD") {
            if !password.is_empty() {
                self.password = Some(password);
            }
        }
    }

    fn clamp_cache_days(&mut self) {
        let clamped = self.category_cache_days.clamp(MIN_CACHE_DAYS, MAX_CACHE_DAYS);
        if clamped != self.category_cache_days {
            warn!(
                "category_cache_days {} outside [{}, {}]; using {}",
                self.category_cache_days, MIN_CACHE_DAYS, MAX_CACHE_DAYS, clamped
            );
            self.category_cache_days = clamped;
        }
    }

    /// Time-to-live for cached taxonomy snapshots.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.category_cache_days * 86_400)
    }

    /// Interval the periodic refresh check compares against. The original
    /// design couples it to the cache duration on purpose.
    pub fn refresh_interval(&self) -> Duration {
        self.cache_ttl()
    }

    /// Whether marketplace credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

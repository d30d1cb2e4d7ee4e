//! Configuration file parser for ~/.config/newsdesk/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::{ClientOptions, DEFAULT_BASE_URL, DEFAULT_COUNTRY, DEFAULT_PAGE_SIZE};
use crate::filters::{Category, FilterOptions, SortBy};
use crate::theme::ThemeVariant;

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "NEWSAPI_KEY";

/// The news API rejects larger pages.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks `api_key`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// News API key. `NEWSAPI_KEY` takes precedence.
    pub api_key: Option<String>,

    /// Base URL of a NewsAPI-compatible service.
    pub base_url: String,

    /// Country for top headlines (ISO 3166-1 alpha-2).
    pub country: String,

    /// Articles per page, 1-100.
    pub page_size: u32,

    pub request_timeout_secs: u64,

    /// Category selected at startup.
    pub default_category: Category,

    /// Sort order selected at startup.
    pub default_sort: SortBy,

    /// Minutes after favoriting before a reading reminder fires. 0 disables.
    pub reminder_minutes: u64,

    /// Where downloaded articles go. Defaults to `<config dir>/downloads`.
    pub download_dir: Option<PathBuf>,

    /// `"dark"` or `"light"`.
    pub theme: ThemeVariant,

    /// Action name → key string, e.g. `quit = "Ctrl+q"`.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 30,
            default_category: Category::All,
            default_sort: SortBy::PublishedAt,
            reminder_minutes: 0,
            download_dir: None,
            theme: ThemeVariant::Dark,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("country", &self.country)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("default_category", &self.default_category)
            .field("default_sort", &self.default_sort)
            .field("reminder_minutes", &self.reminder_minutes)
            .field("download_dir", &self.download_dir)
            .field("theme", &self.theme)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 11] = [
        "api_key",
        "base_url",
        "country",
        "page_size",
        "request_timeout_secs",
        "default_category",
        "default_sort",
        "reminder_minutes",
        "download_dir",
        "theme",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range `page_size` → clamped, with a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        if !(1..=MAX_PAGE_SIZE).contains(&config.page_size) {
            let clamped = config.page_size.clamp(1, MAX_PAGE_SIZE);
            tracing::warn!(page_size = config.page_size, clamped, "page_size out of range");
            config.page_size = clamped;
        }
        tracing::info!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// API key from `env_value` if non-blank, else from the file.
    pub fn api_key(&self, env_value: Option<String>) -> Option<SecretString> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|v| !v.trim().is_empty()))
            .map(|v| SecretString::from(v.trim().to_string()))
    }

    /// Gateway settings, reading the key override from the environment.
    pub fn client_options(&self) -> ClientOptions {
        self.client_options_with_env(std::env::var(API_KEY_ENV).ok())
    }

    pub fn client_options_with_env(&self, env_value: Option<String>) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            api_key: self.api_key(env_value),
            country: self.country.clone(),
            page_size: self.page_size,
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn default_filters(&self) -> FilterOptions {
        FilterOptions::default()
            .with_category(self.default_category)
            .with_sort_by(self.default_sort)
    }

    pub fn reminder_delay(&self) -> Option<Duration> {
        (self.reminder_minutes > 0).then(|| Duration::from_secs(self.reminder_minutes.saturating_mul(60)))
    }

    pub fn download_dir_or(&self, config_dir: &Path) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("downloads"))
    }
}

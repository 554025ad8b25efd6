//! User settings and preferences
//!
//! Manages application settings stored in ~/.querydeck/config.toml

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "QUERYDECK_API_URL";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the backend API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Query text the console starts with (and returns to on logout)
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Keep the session across restarts
    #[serde(default)]
    pub remember_session: bool,

    /// Where exports are written (defaults to ~/.querydeck/exports)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Open exported files with the OS default viewer
    #[serde(default = "default_true")]
    pub open_exports: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_query() -> String {
    "SELECT version();".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            default_query: default_query(),
            remember_session: false,
            export_dir: None,
            open_exports: default_true(),
        }
    }
}

impl Settings {
    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Export directory, falling back to ~/.querydeck/exports
    pub fn resolved_export_dir(&self) -> ConfigResult<PathBuf> {
        match &self.export_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("exports")),
        }
    }

    /// Apply an API URL override (env var or CLI flag). Blank values are ignored.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        self
    }

    fn validate(self) -> ConfigResult<Self> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Get the config directory path (~/.querydeck/)
pub fn config_dir() -> ConfigResult<PathBuf> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".querydeck"))
}

/// Default settings file path
pub fn settings_file() -> ConfigResult<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load settings from the default config file, then apply the env override
pub fn load_settings() -> ConfigResult<Settings> {
    let path = settings_file()?;
    let settings = load_settings_from(&path)?;
    settings
        .with_api_url(std::env::var(API_URL_ENV).ok())
        .validate()
}

/// Load settings from a specific file. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> ConfigResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    settings.validate()
}

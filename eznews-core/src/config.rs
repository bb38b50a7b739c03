//! Configuration management
//!
//! Settings live in `<app dir>/settings.json`:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:5000/api", "timeoutSecs": 30 },
//!   "listing": { "pageSize": 9, "searchDebounceMs": 500 }
//! }
//! ```
//! Keys this crate does not know about are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::services::listing::DEFAULT_PAGE_SIZE;
use crate::services::search::DEFAULT_DEBOUNCE;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const SETTINGS_FILE: &str = "settings.json";
pub const SESSION_FILE: &str = "session.json";

pub const ENV_DIR: &str = "EZNEWS_DIR";
pub const ENV_API_URL: &str = "EZNEWS_API_URL";
pub const ENV_PAGE_SIZE: &str = "EZNEWS_PAGE_SIZE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    listing: ListingSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_debounce_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Effective client configuration (file values with env overrides applied)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// App directory: `$EZNEWS_DIR`, else `~/.eznews`
pub fn app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DIR) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".eznews"))
}

fn read_settings(app_dir: &Path) -> Result<SettingsFile> {
    let settings_path = app_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    // A hand-edited file that no longer parses falls back to defaults
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

/// Check that `url` is an absolute http(s) URL with a host
pub fn validate_api_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).context("Invalid API URL format")?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        bail!("API URL must use http or https");
    }
    if parsed.host_str().unwrap_or("").is_empty() {
        bail!("API URL must include a host");
    }
    Ok(())
}

impl Config {
    /// Load from the app directory, then apply environment overrides
    pub fn load(app_dir: &Path) -> Result<Self> {
        Self::load_with_env(app_dir, |key| std::env::var(key).ok())
    }

    /// `load` with an injectable environment lookup
    pub fn load_with_env<F>(app_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = read_settings(app_dir)?;
        let defaults = Self::default();

        let mut config = Self {
            api_url: raw.api.base_url.unwrap_or(defaults.api_url),
            timeout: raw
                .api
                .timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            page_size: raw.listing.page_size.filter(|n| *n > 0).unwrap_or(defaults.page_size),
            search_debounce: raw
                .listing
                .search_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_debounce),
        };

        if let Some(url) = env(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(size) = env(ENV_PAGE_SIZE) {
            match size.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.page_size = n,
                _ => bail!("{} must be a positive integer, got {:?}", ENV_PAGE_SIZE, size),
            }
        }

        Ok(config)
    }

    /// Write managed fields back, keeping every other key in the file
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(app_dir)?;
        let mut settings = read_settings(app_dir)?;

        settings.api.base_url = Some(self.api_url.clone());
        settings.api.timeout_secs = Some(self.timeout.as_secs());
        settings.listing.page_size = Some(self.page_size);
        settings.listing.search_debounce_ms = Some(self.search_debounce.as_millis() as u64);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(app_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Point the client at another API root
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        validate_api_url(url)?;
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.page_size, 9);
        assert_eq!(config.search_debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api": {"baseUrl": "http://news.local/api"}, "listing": {"pageSize": 12}}"#,
        )
        .unwrap();

        let config = Config::load_with_env(dir.path(), no_env).unwrap();
        assert_eq!(config.api_url, "http://news.local/api");
        assert_eq!(config.page_size, 12);

        let config = Config::load_with_env(dir.path(), |key| match key {
            ENV_API_URL => Some("https://eznews.example/api".into()),
            ENV_PAGE_SIZE => Some("6".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_url, "https://eznews.example/api");
        assert_eq!(config.page_size, 6);
    }

    #[test]
    fn test_bad_page_size_env_is_an_error() {
        let dir = tempdir().unwrap();
        let result = Config::load_with_env(dir.path(), |key| {
            (key == ENV_PAGE_SIZE).then(|| "zero".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "api": {"baseUrl": "http://old/api", "retries": 2}}"#,
        )
        .unwrap();

        let mut config = Config::load_with_env(dir.path(), no_env).unwrap();
        config.set_api_url("https://eznews.example/api/").unwrap();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["api"]["retries"], 2);
        assert_eq!(saved["api"]["baseUrl"], "https://eznews.example/api");
    }

    #[test]
    fn test_set_api_url_rejects_bad_urls() {
        let mut config = Config::default();
        assert!(config.set_api_url("ftp://eznews.example").is_err());
        assert!(config.set_api_url("eznews").is_err());
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;
use crate::store::StoreOptions;
use crate::view_model::{DEFAULT_PAGE_SIZE, SortOrder};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base_url {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("page_size must be greater than zero")]
    PageSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Pull the page back into range when a search narrows the results.
    #[serde(default)]
    pub clamp_page_on_filter: bool,
    /// Fixed seed for the initial like counts.
    #[serde(default)]
    pub like_seed: Option<u64>,
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_fps: default_tick_rate(),
            base_url: default_base_url(),
            page_size: default_page_size(),
            sort_order: SortOrder::default(),
            clamp_page_on_filter: false,
            like_seed: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if self.page_size == 0 {
            return Err(ConfigError::PageSize);
        }
        Ok(())
    }

    /// Apply `POSTFEED_*` overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get("POSTFEED_BASE_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = get("POSTFEED_PAGE_SIZE") {
            match raw.parse() {
                Ok(size) => self.page_size = size,
                Err(e) => tracing::warn!("ignoring POSTFEED_PAGE_SIZE={raw:?}: {e}"),
            }
        }
        if let Some(raw) = get("POSTFEED_SORT") {
            match raw.parse() {
                Ok(order) => self.sort_order = order,
                Err(e) => tracing::warn!("ignoring POSTFEED_SORT: {e}"),
            }
        }
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            clamp_page_on_filter: self.clamp_page_on_filter,
            seed: self.like_seed,
            page_size: Some(self.page_size),
            sort_order: self.sort_order,
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/postfeed"))
}

/// Load `.env` files so `POSTFEED_*` variables can live next to the config.
///
/// Variables already set in the environment take precedence.
pub fn load_env_files() {
    if let Some(dir) = config_dir() {
        let _ = dotenvy::from_path(dir.join(".env"));
    }
    let _ = dotenvy::dotenv();
}

pub fn load_config() -> AppConfig {
    load_env_files();

    let mut config = config_dir()
        .map(|dir| dir.join("config.toml"))
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|contents| parse_config(&contents))
        .unwrap_or_default();

    config.apply_env_overrides(|name| std::env::var(name).ok());
    config
}

fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("invalid config file, using defaults: {e}");
        AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.sort_order, SortOrder::Ascending);
        assert!(!config.clamp_page_on_filter);
    }

    #[test]
    fn parses_partial_file() {
        let config = parse_config(
            r#"
            page_size = 20
            sort_order = "descending"
            clamp_page_on_filter = true
            "#,
        );
        assert_eq!(config.page_size, 20);
        assert_eq!(config.sort_order, SortOrder::Descending);
        assert!(config.clamp_page_on_filter);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| match name {
            "POSTFEED_BASE_URL" => Some("http://localhost:3000".into()),
            "POSTFEED_PAGE_SIZE" => Some("25".into()),
            "POSTFEED_SORT" => Some("desc".into()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sort_order, SortOrder::Descending);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|name| match name {
            "POSTFEED_PAGE_SIZE" => Some("lots".into()),
            _ => None,
        });
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn validate_rejects_zero_page_size_and_bad_url() {
        let mut config = AppConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::PageSize)));

        config.page_size = 10;
        config.base_url = "::not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl { .. })));
    }
}

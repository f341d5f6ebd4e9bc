//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (NOVEL_SW_*)
//! 2. TOML config file (if NOVEL_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (NOVEL_SW_*)
/// 2. TOML config file (if NOVEL_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix shared by every partition this coordinator owns.
    ///
    /// Set via NOVEL_SW_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag embedded in partition names. Bumping it orphans the
    /// previous partitions, which activation then deletes.
    ///
    /// Set via NOVEL_SW_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin of the site the coordinator serves (scheme, host, port).
    ///
    /// Set via NOVEL_SW_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Paths fetched into the static partition at install time.
    ///
    /// Must track the site's top-level navigation routes.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Path of the precached error page served when offline.
    #[serde(default = "default_offline_fallback_path")]
    pub offline_fallback_path: String,

    /// Path fragment that marks bundler-emitted static assets.
    #[serde(default = "default_asset_marker")]
    pub asset_marker: String,

    /// Freshness window for bundler assets, in seconds.
    #[serde(default = "default_static_max_age_secs")]
    pub static_max_age_secs: u64,

    /// Freshness window for images, in seconds.
    #[serde(default = "default_image_max_age_secs")]
    pub image_max_age_secs: u64,

    /// Path to the SQLite partition database.
    ///
    /// Set via NOVEL_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Keep partitions in memory instead of SQLite.
    #[serde(default)]
    pub in_memory: bool,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network request timeout in milliseconds. An expired timeout counts as
    /// a network failure.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_prefix() -> String {
    "novel-reader".into()
}

fn default_cache_version() -> String {
    "v2.0.0".into()
}

fn default_origin() -> String {
    "http://localhost:4321".into()
}

fn default_precache_urls() -> Vec<String> {
    ["/", "/latest", "/popular", "/completed", "/search", "/bookmarks", "/manifest.json", "/404.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_fallback_path() -> String {
    "/404.html".into()
}

fn default_asset_marker() -> String {
    "/_astro/".into()
}

fn default_static_max_age_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_image_max_age_secs() -> u64 {
    30 * 24 * 60 * 60
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./novel-sw-cache.sqlite")
}

fn default_user_agent() -> String {
    "novel-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            origin: default_origin(),
            precache_urls: default_precache_urls(),
            offline_fallback_path: default_offline_fallback_path(),
            asset_marker: default_asset_marker(),
            static_max_age_secs: default_static_max_age_secs(),
            image_max_age_secs: default_image_max_age_secs(),
            db_path: default_db_path(),
            in_memory: false,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn static_max_age(&self) -> Duration {
        Duration::from_secs(self.static_max_age_secs)
    }

    pub fn image_max_age(&self) -> Duration {
        Duration::from_secs(self.image_max_age_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NOVEL_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NOVEL_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

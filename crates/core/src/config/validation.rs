//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_prefix` or `cache_version` is empty or contains whitespace
    /// - `origin` is not an absolute http(s) URL
    /// - a precache entry or the fallback path is not a root-relative path
    /// - a freshness window is 0
    /// - `timeout_ms` is outside 100ms..=5min
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("cache_prefix", &self.cache_prefix), ("cache_version", &self.cache_version)] {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(invalid(field, "must not contain whitespace"));
            }
        }

        let origin = Url::parse(&self.origin).map_err(|e| invalid("origin", e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }

        if let Some(bad) = self.precache_urls.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("precache_urls", format!("{bad} is not a root-relative path")));
        }
        if !self.offline_fallback_path.starts_with('/') {
            return Err(invalid("offline_fallback_path", "must start with '/'"));
        }

        if self.static_max_age_secs == 0 {
            return Err(invalid("static_max_age_secs", "must be greater than 0"));
        }
        if self.image_max_age_secs == 0 {
            return Err(invalid("image_max_age_secs", "must be greater than 0"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !self.precache_urls.contains(&self.offline_fallback_path) {
            tracing::warn!(
                fallback = %self.offline_fallback_path,
                "offline fallback page is not in precache_urls; offline navigations will get the inline page"
            );
        }

        Ok(())
    }
}

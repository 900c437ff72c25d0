//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SNAPVAULT_*)
//! 2. TOML config file (if SNAPVAULT_CONFIG_FILE set)
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
/// 1. Environment variables (SNAPVAULT_*)
/// 2. TOML config file (if SNAPVAULT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage root for blobs and, by default, the index file.
    ///
    /// Set via SNAPVAULT_ROOT environment variable.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Explicit index file location, overriding `<root>/index.sqlite`.
    ///
    /// Set via SNAPVAULT_DB_PATH environment variable.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SNAPVAULT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SNAPVAULT_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SNAPVAULT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_root() -> PathBuf {
    PathBuf::from("./snapvault")
}

fn default_user_agent() -> String {
    "snapvault/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            db_path: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolved index file location.
    pub fn index_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| self.root.join("index.sqlite"))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SNAPVAULT_`
    /// 2. TOML file from `SNAPVAULT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SNAPVAULT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SNAPVAULT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.root, PathBuf::from("./snapvault"));
        assert!(config.db_path.is_none());
        assert_eq!(config.user_agent, "snapvault/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_index_path_defaults_under_root() {
        let config = AppConfig::default();
        assert_eq!(config.index_path(), PathBuf::from("./snapvault/index.sqlite"));
    }

    #[test]
    fn test_index_path_override() {
        let config = AppConfig { db_path: Some(PathBuf::from("/tmp/meta.sqlite")), ..Default::default() };
        assert_eq!(config.index_path(), PathBuf::from("/tmp/meta.sqlite"));
    }
}

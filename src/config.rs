//! Configuration for the capture agent.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scoring service used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://default.demo.area2-ai.com";

pub const ENV_API_BASE_URL: &str = "A2_API_BASE_URL";
pub const ENV_DEVKEY_BASE_URL: &str = "A2_DEVKEY_BASE_URL";
pub const ENV_API_KEY: &str = "A2_API_KEY";
pub const ENV_TIME_ZONE: &str = "A2_TIME_ZONE";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the neuroprofile scoring service
    pub api_base_url: String,

    /// Base URL of the dev-access key validation service
    pub devkey_base_url: String,

    /// Developer credentials validated once at provider start
    pub credentials: Option<CredentialsConfig>,

    /// Allow capture when no credentials are configured at all
    pub allow_without_credentials: bool,

    /// IANA timezone reported with every session
    pub time_zone: String,

    /// Identification attached to records as `appContext`
    pub app_context: AppContextConfig,

    /// Finalize desktop sessions when Enter is released
    pub end_session_on_enter: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            devkey_base_url: String::new(),
            credentials: None,
            allow_without_credentials: false,
            time_zone: "UTC".to_string(),
            app_context: AppContextConfig::default(),
            end_session_on_enter: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("area2-capture")
            .join("config.json")
    }

    /// Override fields from `A2_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_DEVKEY_BASE_URL) {
            self.devkey_base_url = url;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.credentials = Some(CredentialsConfig { api_key });
        }
        if let Some(tz) = lookup(ENV_TIME_ZONE) {
            self.time_zone = tz;
        }
    }

    /// Check values that would otherwise fail late.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api_base_url must not be empty".to_string(),
            ));
        }
        self.time_zone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ConfigError::Invalid(format!("unknown time zone '{}'", self.time_zone)))?;
        Ok(())
    }

    /// `appContext` string attached to finalized records.
    pub fn app_context(&self) -> String {
        self.app_context.to_string()
    }
}

/// Developer credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub api_key: String,
}

/// OS and client identification reported as `"<os> - <client>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppContextConfig {
    pub os: String,
    pub client: String,
}

impl Default for AppContextConfig {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            client: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Display for AppContextConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.os, self.client)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.credentials.is_none());
        assert!(!config.allow_without_credentials);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_BASE_URL, "http://127.0.0.1:9000"),
            (ENV_API_KEY, "dev-key"),
            (ENV_TIME_ZONE, "America/Bogota"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.credentials.unwrap().api_key, "dev-key");
        assert_eq!(config.time_zone, "America/Bogota");
        assert!(config.devkey_base_url.is_empty());
    }

    #[test]
    fn test_invalid_time_zone() {
        let config = Config {
            time_zone: "Mars/Olympus".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            credentials: Some(CredentialsConfig {
                api_key: "abc".to_string(),
            }),
            end_session_on_enter: true,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"allow_without_credentials": true}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.allow_without_credentials);
        assert_eq!(config.time_zone, "UTC");
    }

    #[test]
    fn test_app_context_format() {
        let context = AppContextConfig {
            os: "macos".to_string(),
            client: "Safari 17".to_string(),
        };
        assert_eq!(context.to_string(), "macos - Safari 17");
    }
}

//! Configuration management for Iris.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`, and every section is
//! `#[serde(default)]` so a partial file only overrides what it names.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Iris.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider selection and credentials
    pub provider: ProviderConfig,

    /// Request shaping
    pub request: RequestConfig,

    /// Rate-limit retry behaviour
    pub retry: RetryConfig,

    /// Client-side quota window
    pub throttle: ThrottleConfig,

    /// Input selection and encoding
    pub processing: ProcessingConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.iris.iris/config.toml
    /// - Linux: ~/.config/iris/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\iris\config\config.toml
    ///
    /// Falls back to ~/.iris/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "iris", "iris")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".iris").join("config.toml")
            })
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.output.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.default, ProviderKind::Openai);
        assert_eq!(config.request.batch_max_tokens, 300);
        assert_eq!(config.request.single_max_tokens, 500);
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[provider.openai]"));
        assert!(toml.contains("[retry]"));
        assert!(toml.contains("[throttle]"));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [provider]
            default = "azure"

            [provider.azure]
            deployment = "vision-prod"

            [throttle]
            max_per_window = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.provider.default, ProviderKind::Azure);
        assert_eq!(config.provider.azure.deployment, "vision-prod");
        assert_eq!(config.provider.azure.api_version, "2023-12-01-preview");
        assert_eq!(config.throttle.max_per_window, 10);
        assert_eq!(config.throttle.window_secs, 60);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_invalid_toml_value_rejected_by_validation() {
        let err = Config::from_toml("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(err.to_string().contains("retry.max_attempts"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[request]\nprompt = \"Count the people\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.request.prompt, "Count the people");
    }

    #[test]
    fn test_output_dir_expands_tilde() {
        let mut config = Config::default();
        config.output.dir = PathBuf::from("~/iris-out");
        let resolved = config.output_dir();
        assert!(!resolved.to_string_lossy().starts_with('~'));
        assert!(resolved.ends_with("iris-out"));
    }
}

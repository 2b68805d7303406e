//! Configuration management for the Green Team service.
//!
//! Settings are resolved from:
//! 1. Default values
//! 2. Config file (`~/.greenteam/config.toml`, or `GREENTEAM_CONFIG`)
//! 3. Environment variables (including a local `.env`)

mod schema;

pub use schema::{
    AgentsConfig, AppConfig, ConfigIssue, GroqConfig, IssueLevel, ProviderConfig, ServerConfig,
    UploadsConfig,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding the Groq API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "GREENTEAM_MODEL";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "GREENTEAM_CONFIG";

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".greenteam")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path.
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::TomlParse`] if it is not a valid config.
pub async fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to a specific path, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::TomlSerialize`] if the config cannot be encoded and
/// [`ConfigError::Io`] if the directory or file cannot be written.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Create a default config file at `path` unless one exists.
///
/// With `force` an existing file is replaced. Returns `true` if a file was
/// written.
///
/// # Errors
///
/// Fails like [`save_config_to`] when a file has to be written.
pub async fn init_config_at(path: &Path, force: bool) -> ConfigResult<bool> {
    if path.exists() && !force {
        debug!(path = %path.display(), "config file exists, leaving it untouched");
        return Ok(false);
    }

    save_config_to(&AppConfig::default(), path).await?;
    info!("created default config at {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let cfg_dir = default_config_dir();
        assert!(cfg_dir.ends_with(".greenteam"));

        let cfg_path = config_path();
        assert!(cfg_path.ends_with("config.toml"));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8501");
    }

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(init_config_at(&path, false).await.unwrap());
        assert!(!init_config_at(&path, false).await.unwrap());

        let mut config = load_config_from(&path).await.unwrap();
        assert_eq!(config.agents.model, "qwen/qwen3-32b");

        config.agents.max_steps = 3;
        save_config_to(&config, &path).await.unwrap();
        assert_eq!(load_config_from(&path).await.unwrap().agents.max_steps, 3);

        assert!(init_config_at(&path, true).await.unwrap());
        assert_eq!(load_config_from(&path).await.unwrap().agents.max_steps, 10);
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[agents\nmodel = 1").await.unwrap();
        let err = load_config_from(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}

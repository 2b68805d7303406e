//! Configuration schema.

use std::net::SocketAddr;
use std::path::PathBuf;

use greenteam::prelude::{Agent, DispatchSettings, OpenAIConfig, UploadNaming, UploadStore};
use serde::{Deserialize, Serialize};

use super::{API_KEY_ENV, MODEL_ENV};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// LLM provider configuration.
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Settings shared by every agent.
    #[serde(default)]
    pub agents: AgentsConfig,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upload storage configuration.
    #[serde(default)]
    pub uploads: UploadsConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Groq configuration.
    #[serde(default)]
    pub groq: Option<GroqConfig>,
}

/// Groq provider config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// Base URL override.
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Model identifier used by all five agents.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum reasoning steps per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// HTTP timeout for one model request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    OpenAIConfig::GROQ_MODEL.to_owned()
}

const fn default_max_steps() -> usize {
    Agent::DEFAULT_MAX_STEPS
}

const fn default_timeout_secs() -> u64 {
    OpenAIConfig::DEFAULT_TIMEOUT_SECS
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_steps: default_max_steps(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_owned()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Directory uploaded CSV files are written to.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Fixed file name. When unset every upload gets a unique name.
    #[serde(default)]
    pub file_name: Option<String>,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from(UploadStore::DEFAULT_DIR)
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            file_name: None,
        }
    }
}

impl AppConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let groq = self.providers.groq.as_ref();
        if groq.is_none_or(|g| g.api_key.trim().is_empty()) {
            issues.push(ConfigIssue::warning(
                "providers.groq.api_key",
                format!("No API key set. Set {API_KEY_ENV} in the environment or .env."),
            ));
        }
        if let Some(base) = groq.and_then(|g| g.api_base.as_deref())
            && !(base.starts_with("http://") || base.starts_with("https://"))
        {
            issues.push(ConfigIssue::error(
                "providers.groq.api_base",
                format!("'{base}' is not an http(s) URL"),
            ));
        }

        if self.agents.model.trim().is_empty() {
            issues.push(ConfigIssue::error("agents.model", "Model must not be empty"));
        }

        if self.agents.max_steps == 0 {
            issues.push(ConfigIssue::error(
                "agents.max_steps",
                "Max steps must be at least 1",
            ));
        }

        if self.agents.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                "agents.timeout_secs",
                "Timeout is 0, model requests will time out immediately",
            ));
        }

        if self.server.bind.parse::<SocketAddr>().is_err() {
            issues.push(ConfigIssue::error(
                "server.bind",
                format!("'{}' is not a socket address", self.server.bind),
            ));
        }

        if let Some(name) = &self.uploads.file_name {
            if name.contains(['/', '\\']) {
                issues.push(ConfigIssue::error(
                    "uploads.file_name",
                    "File name must not contain a path separator",
                ));
            } else if !name.to_ascii_lowercase().ends_with(".csv") {
                issues.push(ConfigIssue::error(
                    "uploads.file_name",
                    "File name must end in .csv",
                ));
            }
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Merge variables from `lookup` into the configuration.
    ///
    /// The API key fills a missing or blank configured key. The model
    /// variable overrides the configured model.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            match &mut self.providers.groq {
                Some(groq) if groq.api_key.trim().is_empty() => groq.api_key = key,
                Some(_) => {}
                None => {
                    self.providers.groq = Some(GroqConfig {
                        api_key: key,
                        api_base: None,
                    });
                }
            }
        }

        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.agents.model = model;
        }

        self
    }

    /// The configured API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.providers
            .groq
            .as_ref()
            .map(|g| g.api_key.as_str())
            .filter(|k| !k.trim().is_empty())
    }

    /// Parse the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`super::ConfigError::InvalidValue`] if `server.bind` is not a
    /// socket address.
    pub fn bind_addr(&self) -> super::ConfigResult<SocketAddr> {
        self.server.bind.parse().map_err(|_| {
            super::ConfigError::InvalidValue(format!("server.bind = '{}'", self.server.bind))
        })
    }

    /// Settings for connecting the team.
    #[must_use]
    pub fn dispatch_settings(&self) -> DispatchSettings {
        let naming = self
            .uploads
            .file_name
            .clone()
            .map_or(UploadNaming::Random, UploadNaming::Fixed);

        DispatchSettings {
            api_key: self.api_key().map(str::to_owned),
            base_url: self
                .providers
                .groq
                .as_ref()
                .and_then(|g| g.api_base.clone()),
            model: self.agents.model.clone(),
            max_steps: self.agents.max_steps,
            timeout_secs: self.agents.timeout_secs,
            upload_dir: self.uploads.dir.clone(),
            upload_naming: naming,
        }
    }

    /// A copy with the API key masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(groq) = &mut config.providers.groq
            && !groq.api_key.is_empty()
        {
            groq.api_key = mask(&groq.api_key);
        }
        config
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}****")
}

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "server.bind").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Error that prevents the service from running correctly.
    Error,
    /// Warning about potential issues.
    Warning,
}

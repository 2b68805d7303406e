//! Errors of the service binary.
//!
//! Request failures never reach this type: the handlers render them into the
//! page. [`AppError`] covers what stops the process.

use crate::config::ConfigError;

/// Result alias for the binary.
pub type AppResult<T> = Result<T, AppError>;

/// Error type for configuration, startup and CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// File system or socket error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A one-shot run failed.
    #[error(transparent)]
    Team(#[from] greenteam::Error),

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Server(String),
}

impl AppError {
    /// Create a server error.
    #[must_use]
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}

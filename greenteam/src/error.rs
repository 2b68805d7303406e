//! Unified error types for the green team.
//!
//! Every failure a caller can see falls into one of four [`ErrorKind`]s:
//! a missing credential, a failed invocation (LLM transport or agent loop),
//! a failed upload, or an invalid request.

pub use crate::agent::AgentError;
pub use crate::llms::LlmError;
pub use crate::upload::UploadError;

/// Result type alias for green team operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The API credential is not configured. Raised before any request is sent.
    #[error("Missing {var}. Add it to your .env and restart.")]
    CredentialMissing {
        /// Name of the environment variable that holds the credential.
        var: String,
    },

    /// LLM provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Agent runtime error.
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Uploaded file could not be stored.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// The submitted request is malformed.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error category, stable across the variants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No API key configured.
    CredentialMissing,
    /// The agent run failed.
    InvocationFailed,
    /// The uploaded file could not be stored.
    UploadFailed,
    /// Form input was rejected.
    InvalidRequest,
}

impl ErrorKind {
    /// Returns a short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialMissing => "credential_missing",
            Self::InvocationFailed => "invocation_failed",
            Self::UploadFailed => "upload_failed",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a credential-missing error for the given variable.
    #[must_use]
    pub fn credential_missing(var: impl Into<String>) -> Self {
        Self::CredentialMissing { var: var.into() }
    }

    /// Create a validation error with a message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialMissing { .. } => ErrorKind::CredentialMissing,
            Self::Llm(_) | Self::Agent(_) | Self::Json(_) => ErrorKind::InvocationFailed,
            Self::Upload(_) => ErrorKind::UploadFailed,
            Self::Validation(_) => ErrorKind::InvalidRequest,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Llm(LlmError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(
            Error::credential_missing("GROQ_API_KEY").kind(),
            ErrorKind::CredentialMissing
        );
        assert_eq!(
            Error::from(LlmError::rate_limited("groq")).kind(),
            ErrorKind::InvocationFailed
        );
        assert_eq!(
            Error::from(AgentError::max_steps(3)).kind(),
            ErrorKind::InvocationFailed
        );
        assert_eq!(
            Error::from(UploadError::unsupported_type("data.xlsx")).kind(),
            ErrorKind::UploadFailed
        );
        assert_eq!(Error::validation("empty").kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn credential_message_names_variable() {
        let err = Error::credential_missing("GROQ_API_KEY");
        assert_eq!(
            err.to_string(),
            "Missing GROQ_API_KEY. Add it to your .env and restart."
        );
    }
}

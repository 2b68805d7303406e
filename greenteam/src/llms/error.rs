//! Errors talking to the hosted model.
//!
//! Every variant ends up as [`Error::Llm`](crate::Error::Llm), which callers
//! see as an invocation failure. Nothing here is retried.

/// Failure of one chat completion request.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// The key was rejected (HTTP 401/403).
    #[error("[{provider}] authentication failed: {message}")]
    Auth {
        /// Provider name (e.g., "groq").
        provider: String,
        /// Message returned by the provider.
        message: String,
    },

    /// HTTP 429.
    #[error("[{provider}] rate limit reached")]
    RateLimited {
        /// Provider name.
        provider: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: expected {expected}, got {got}")]
    ResponseFormat {
        /// What was expected.
        expected: String,
        /// What arrived.
        got: String,
    },

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success status with a body that is not a provider error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Error object returned by the provider.
    #[error("[{provider}] {code}: {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Provider error code, or its error type when no code is given.
        code: String,
        /// Error description.
        message: String,
    },

    /// Client-side failure before any request was sent.
    #[error("{0}")]
    Internal(String),
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ResponseFormat {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The HTTP status behind this error, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { .. } => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format("chat completion JSON", err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_provider() {
        assert_eq!(
            LlmError::auth("groq", "Invalid API Key").to_string(),
            "[groq] authentication failed: Invalid API Key"
        );
        assert_eq!(
            LlmError::provider_code("groq", "model_not_found", "no such model").to_string(),
            "[groq] model_not_found: no such model"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(LlmError::rate_limited("groq").status(), Some(429));
        assert_eq!(LlmError::http_status(502, "bad gateway").status(), Some(502));
        assert_eq!(LlmError::Timeout.status(), None);
    }
}

//! OpenAI-compatible client configuration.

/// Configuration for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model to use.
    pub model: String,
    /// Provider name reported in errors and logs.
    pub provider: &'static str,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl OpenAIConfig {
    /// Groq's OpenAI-compatible base URL.
    pub const GROQ_BASE_URL: &'static str = "https://api.groq.com/openai/v1";
    /// Model the green team runs on.
    pub const GROQ_MODEL: &'static str = "qwen/qwen3-32b";
    /// Environment variable holding the Groq API key.
    pub const GROQ_API_KEY_VAR: &'static str = "GROQ_API_KEY";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Creates a Groq configuration with the given API key.
    #[must_use]
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::GROQ_BASE_URL.to_owned(),
            model: Self::GROQ_MODEL.to_owned(),
            provider: "groq",
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groq_preset() {
        let config = OpenAIConfig::groq("gsk-test");
        assert_eq!(config.api_key, "gsk-test");
        assert_eq!(config.base_url, OpenAIConfig::GROQ_BASE_URL);
        assert_eq!(config.model, "qwen/qwen3-32b");
        assert_eq!(config.provider, "groq");
    }

    #[test]
    fn builder() {
        let config = OpenAIConfig::groq("key")
            .with_model("llama-3.3-70b-versatile")
            .with_base_url("http://localhost:9999/v1")
            .with_timeout(60);

        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.timeout_secs, Some(60));
    }
}

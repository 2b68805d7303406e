//! OpenAI-compatible API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chat::ChatRequest;
use crate::error::{Error, LlmError, Result};
use crate::message::{Message, Role};
use crate::tool::ToolDefinition;

use super::config::OpenAIConfig;
use super::types::{
    OpenAIChatRequest, OpenAIErrorResponse, OpenAIFunction, OpenAIFunctionCall, OpenAIMessage,
    OpenAITool, OpenAIToolCall,
};

/// OpenAI-compatible API client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialMissing`] if the API key is empty, or an
    /// internal LLM error if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::credential_missing(OpenAIConfig::GROQ_API_KEY_VAR));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the chat completions URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build request headers for JSON requests.
    pub(crate) fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
    }

    /// Convert a [`Message`] to the wire format.
    pub(crate) fn convert_message(msg: &Message) -> OpenAIMessage {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| OpenAIToolCall {
                    id: tc.id.clone(),
                    call_type: "function".to_owned(),
                    function: OpenAIFunctionCall {
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    },
                })
                .collect()
        });

        OpenAIMessage {
            role: role.to_owned(),
            content: msg.content.clone(),
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
            name: msg.name.clone(),
        }
    }

    /// Convert a [`ToolDefinition`] to the wire format.
    pub(crate) fn convert_tool(tool: &ToolDefinition) -> OpenAITool {
        OpenAITool {
            tool_type: "function".to_owned(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }

    /// Build the request body.
    pub(crate) fn build_body(&self, request: &ChatRequest) -> OpenAIChatRequest {
        let messages = request.messages.iter().map(Self::convert_message).collect();

        let tools = request
            .tools
            .as_ref()
            .map(|t| t.iter().map(Self::convert_tool).collect());

        let model = if request.model.is_empty() {
            self.config.model.clone()
        } else {
            request.model.clone()
        };

        OpenAIChatRequest {
            model,
            messages,
            tools,
            parallel_tool_calls: request.parallel_tool_calls,
            stream: false,
        }
    }

    /// Parse an error response body into an [`LlmError`].
    pub(crate) fn parse_error(provider: &str, status: u16, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = error.code.unwrap_or_else(|| error.error_type.clone());

            return match status {
                401 | 403 => LlmError::auth(provider, error.message),
                429 => LlmError::rate_limited(provider),
                _ => LlmError::provider_code(provider, code, error.message),
            };
        }

        LlmError::http_status(status, body.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;

    fn client() -> OpenAI {
        OpenAI::new(OpenAIConfig::groq("gsk-test")).unwrap()
    }

    #[test]
    fn empty_key_is_credential_missing() {
        let err = OpenAI::new(OpenAIConfig::groq("  ")).unwrap_err();
        assert!(matches!(err, Error::CredentialMissing { ref var } if var == "GROQ_API_KEY"));
    }

    #[test]
    fn message_conversion() {
        let converted = OpenAI::convert_message(&Message::user("Hello!"));
        assert_eq!(converted.role, "user");
        assert_eq!(converted.content.as_deref(), Some("Hello!"));

        let calls = Message::assistant_tool_calls(vec![ToolCall::function(
            "call_1",
            "news_analyst",
            r#"{"task":"x"}"#,
        )]);
        let converted = OpenAI::convert_message(&calls);
        let tc = &converted.tool_calls.unwrap()[0];
        assert_eq!(tc.call_type, "function");
        assert_eq!(tc.function.name, "news_analyst");
    }

    #[test]
    fn body_falls_back_to_default_model() {
        let body = client().build_body(&ChatRequest::default().user("hi"));
        assert_eq!(body.model, "qwen/qwen3-32b");
        assert!(!body.stream);
        assert!(body.tools.is_none());
    }

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let c = OpenAI::new(OpenAIConfig::groq("k").with_base_url("http://h/v1/")).unwrap();
        assert_eq!(c.chat_url(), "http://h/v1/chat/completions");
    }

    #[test]
    fn error_mapping() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert!(matches!(
            OpenAI::parse_error("groq", 401, body),
            LlmError::Auth { .. }
        ));
        assert!(matches!(
            OpenAI::parse_error("groq", 429, body),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            OpenAI::parse_error("groq", 400, body),
            LlmError::Provider { ref code, .. } if code == "invalid_api_key"
        ));
        assert!(matches!(
            OpenAI::parse_error("groq", 502, "<html>bad gateway</html>"),
            LlmError::HttpStatus { status: 502, .. }
        ));
    }
}

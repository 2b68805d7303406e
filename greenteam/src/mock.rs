//! In-memory chat provider for tests and offline runs.
//!
//! [`MockProvider`] returns scripted responses in sequence, cycling through
//! them, and records every request it receives.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use greenteam::mock::MockProvider;
//!
//! let provider = Arc::new(MockProvider::with_texts(["Hello!", "Goodbye!"]));
//! // First call returns "Hello!", second "Goodbye!", third "Hello!" again...
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};

/// A scripted [`ChatProvider`].
#[derive(Debug)]
pub struct MockProvider {
    responses: Vec<ChatResponse>,
    failure: Option<LlmError>,
    index: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a provider that replays the given responses.
    #[must_use]
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses,
            failure: None,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that replays plain text answers.
    #[must_use]
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(ChatResponse::from_text).collect())
    }

    /// Create a provider whose every call fails with `error`.
    #[must_use]
    pub fn failing(error: LlmError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Vec::new())
        }
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let index = self.index.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = &self.failure {
            return Err(err.clone().into());
        }

        if self.responses.is_empty() {
            return Ok(ChatResponse::from_text("No response"));
        }
        Ok(self.responses[index % self.responses.len()].clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ask(provider: &MockProvider, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(provider.default_model()).user(prompt);
        Ok(provider.chat(&request).await?.text().unwrap_or_default())
    }

    #[tokio::test]
    async fn cycles_responses() {
        let provider = MockProvider::with_texts(["first", "second"]);

        assert_eq!(ask(&provider, "a").await.unwrap(), "first");
        assert_eq!(ask(&provider, "b").await.unwrap(), "second");
        assert_eq!(ask(&provider, "c").await.unwrap(), "first");
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests()[1].messages[0].text(), Some("b"));
        assert_eq!(provider.requests()[1].model, "mock-model");
    }

    #[tokio::test]
    async fn failing_provider() {
        let provider = MockProvider::failing(LlmError::rate_limited("mock"));
        let err = ask(&provider, "x").await.unwrap_err();
        assert!(matches!(err, crate::Error::Llm(LlmError::RateLimited { .. })));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_script_still_answers() {
        let provider = MockProvider::new(Vec::new());
        assert_eq!(ask(&provider, "x").await.unwrap(), "No response");
    }
}

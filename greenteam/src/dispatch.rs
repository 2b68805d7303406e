//! Request dispatch: one form submission, one agent run.
//!
//! [`Dispatcher::dispatch`] validates the form, stores the upload (if any),
//! selects exactly one agent, assembles the prompt and runs the agent. The
//! result is a [`Reply`] with explicit optional fields; the fallback order
//! is applied only by [`Reply::display_text`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};

use crate::agent::{RunConfig, RunResult, ToolCallRecord};
use crate::error::{Error, Result};
use crate::llms::{OpenAI, OpenAIConfig};
use crate::prompt::{self, RequestForm};
use crate::registry::AgentRegistry;
use crate::upload::{StoredUpload, UploadNaming, UploadStore};
use crate::usage::Usage;

/// Everything needed to connect the team to the hosted model.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Groq API key. `None` or blank means not configured.
    pub api_key: Option<String>,
    /// Overrides the OpenAI-compatible base URL.
    pub base_url: Option<String>,
    /// Model identifier for every agent.
    pub model: String,
    /// Step limit for every agent.
    pub max_steps: usize,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Upload directory.
    pub upload_dir: PathBuf,
    /// Upload naming scheme.
    pub upload_naming: UploadNaming,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: OpenAIConfig::GROQ_MODEL.to_owned(),
            max_steps: crate::agent::Agent::DEFAULT_MAX_STEPS,
            timeout_secs: OpenAIConfig::DEFAULT_TIMEOUT_SECS,
            upload_dir: PathBuf::from(UploadStore::DEFAULT_DIR),
            upload_naming: UploadNaming::Random,
        }
    }
}

impl DispatchSettings {
    /// Returns `true` if a non-blank API key is set.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// The answer of one run, with explicit optional fields.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// String output of the run.
    pub content: Option<String>,
    /// Text of the last model message.
    pub text: Option<String>,
    /// JSON rendering of the raw output.
    pub fallback: String,
    /// Agent that produced the reply.
    pub agent_name: String,
    /// Tokens used, delegations included.
    pub usage: Usage,
    /// Delegations performed during the run.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Whether the agent wants its delegations displayed.
    pub show_tool_calls: bool,
}

impl Reply {
    fn from_run(result: &RunResult, show_tool_calls: bool) -> Self {
        Self {
            content: result.text().map(str::to_owned),
            text: result.last_message_text().map(str::to_owned),
            fallback: result.output.to_string(),
            agent_name: result.agent_name.clone(),
            usage: result.usage,
            tool_calls: result.tool_calls(),
            show_tool_calls,
        }
    }

    /// The text to show: `content`, else `text`, else `fallback`.
    #[must_use]
    pub fn display_text(&self) -> &str {
        [self.content.as_deref(), self.text.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(&self.fallback)
    }
}

/// Echo of the request, shown in the debug panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugContext {
    /// Routing mode label.
    pub mode: String,
    /// Selected specialist, in single-specialist mode.
    pub specialist: Option<String>,
    /// City as entered.
    pub city: String,
    /// Lookback window.
    pub months: Option<u8>,
    /// Stored CSV path, if a file was uploaded.
    pub csv_path: Option<String>,
}

impl DebugContext {
    /// Pretty JSON for display.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| Value::Null.to_string())
    }
}

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// The agent's reply.
    pub reply: Reply,
    /// What was sent.
    pub debug: DebugContext,
    /// The exact prompt given to the agent.
    pub prompt: String,
}

/// Routes form submissions to the team.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<AgentRegistry>,
    uploads: UploadStore,
}

impl Dispatcher {
    /// Create a dispatcher over an existing team.
    #[must_use]
    pub fn new(registry: AgentRegistry, uploads: UploadStore) -> Self {
        Self {
            registry: Arc::new(registry),
            uploads,
        }
    }

    /// Build a Groq-backed team from settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CredentialMissing`] when no API key is configured;
    /// no request is sent in that case.
    pub fn connect(settings: &DispatchSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::credential_missing(OpenAIConfig::GROQ_API_KEY_VAR))?;

        let mut config = OpenAIConfig::groq(api_key)
            .with_model(&settings.model)
            .with_timeout(settings.timeout_secs);
        if let Some(url) = &settings.base_url {
            config = config.with_base_url(url);
        }

        let client = OpenAI::new(config)?;
        info!(model = %settings.model, base_url = client.base_url(), "Connected to provider");

        let registry =
            AgentRegistry::new(Arc::new(client), &settings.model).with_max_steps(settings.max_steps);
        let uploads = UploadStore::new(&settings.upload_dir, settings.upload_naming.clone());
        Ok(Self::new(registry, uploads))
    }

    /// The team behind this dispatcher.
    #[must_use]
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// The upload store.
    #[must_use]
    pub const fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Run one submission end to end.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] for a blank prompt
    /// - [`Error::Upload`] if the upload cannot be stored
    /// - [`Error::Llm`] / [`Error::Agent`] if the agent run fails
    ///
    /// Nothing is retried.
    pub async fn dispatch(&self, form: RequestForm) -> Result<Outcome> {
        let span = info_span!(
            "dispatch",
            route = %form.route,
            city = %form.city,
            months = form.months,
            upload = form.upload.is_some(),
        );
        self.dispatch_inner(form).instrument(span).await
    }

    async fn dispatch_inner(&self, form: RequestForm) -> Result<Outcome> {
        form.validate()?;

        // Held until the outcome is built; a random upload is deleted on drop.
        let stored = match &form.upload {
            Some(upload) => Some(self.uploads.store(upload).await?),
            None => None,
        };

        let agent = self.registry.resolve(&form.route);
        let context = form.context(stored.as_ref().map(StoredUpload::path));
        let prompt = prompt::assemble(&form.prompt, &context);

        let result = agent
            .run(prompt.clone(), RunConfig::default())
            .await
            .inspect_err(|e| warn!(error = %e, agent = %agent.name(), "Dispatch failed"))?;

        let reply = Reply::from_run(&result, agent.shows_tool_calls());
        let debug = DebugContext {
            mode: form.route.mode().to_owned(),
            specialist: form.route.specialist().map(|s| s.display_name().to_owned()),
            city: form.city,
            months: form.months,
            csv_path: context.csv_path,
        };

        drop(stored);
        Ok(Outcome {
            reply,
            debug,
            prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatResponse;
    use crate::message::Message;

    fn run_result(output: Value, last: Message) -> RunResult {
        RunResult {
            output,
            usage: Usage::zero(),
            steps: 1,
            step_history: vec![crate::agent::StepInfo {
                step: 1,
                response: ChatResponse::new(last),
                tool_calls: Vec::new(),
            }],
            agent_name: "News Analyst".into(),
        }
    }

    #[test]
    fn display_prefers_content() {
        let reply = Reply::from_run(
            &run_result(Value::String("answer".into()), Message::assistant("answer")),
            true,
        );
        assert_eq!(reply.content.as_deref(), Some("answer"));
        assert_eq!(reply.display_text(), "answer");
    }

    #[test]
    fn display_falls_back_in_order() {
        let reply = Reply {
            content: None,
            text: Some("from text".into()),
            fallback: "null".into(),
            agent_name: String::new(),
            usage: Usage::zero(),
            tool_calls: Vec::new(),
            show_tool_calls: false,
        };
        assert_eq!(reply.display_text(), "from text");

        let reply = Reply::from_run(&run_result(Value::Null, Message::default()), false);
        assert_eq!(reply.content, None);
        assert_eq!(reply.display_text(), "null");
    }

    #[test]
    fn connect_requires_a_key() {
        for key in [None, Some(String::new()), Some("   ".to_owned())] {
            let settings = DispatchSettings {
                api_key: key,
                ..DispatchSettings::default()
            };
            assert!(!settings.has_credential());
            let err = Dispatcher::connect(&settings).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::CredentialMissing);
        }
    }

    #[test]
    fn connect_builds_the_team() {
        let settings = DispatchSettings {
            api_key: Some("gsk-test".into()),
            max_steps: 4,
            ..DispatchSettings::default()
        };
        let dispatcher = Dispatcher::connect(&settings).unwrap();
        assert_eq!(dispatcher.registry().coordinator().get_max_steps(), 4);
        assert_eq!(dispatcher.registry().coordinator().get_model(), "qwen/qwen3-32b");
    }

    #[test]
    fn debug_json_shape() {
        let debug = DebugContext {
            mode: "Team Coordinator".into(),
            specialist: None,
            city: "Karachi".into(),
            months: Some(12),
            csv_path: None,
        };
        let json: Value = serde_json::from_str(&debug.to_json()).unwrap();
        assert_eq!(json["mode"], "Team Coordinator");
        assert_eq!(json["months"], 12);
        assert!(json["csv_path"].is_null());
    }
}

//! Agent configuration types.
//!
//! An [`Agent`] is a declarative record: who it is, what it is told, which
//! model answers for it and which specialists it may delegate to. It carries
//! no execution logic; the [`Runner`](super::Runner) drives it.
//!
//! # Example
//!
//! ```rust,ignore
//! use greenteam::agent::Agent;
//! use greenteam::tool::ToolKind;
//!
//! let news = Agent::new("News Analyst")
//!     .role("Find recent news on sustainability initiatives")
//!     .instruction("Search for city-level green project in the last year")
//!     .tools(vec![ToolKind::Arxiv, ToolKind::GoogleSearch])
//!     .model("qwen/qwen3-32b")
//!     .provider(groq.clone());
//! ```

use std::fmt::{self, Write as _};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::chat::SharedChatProvider;
use crate::error::Result;
use crate::tool::{ToolDefinition, ToolKind};

use super::result::{RunConfig, RunResult};

/// A configured language-model agent.
#[derive(Clone)]
pub struct Agent {
    /// Display name. Unique within a team.
    pub(crate) name: String,

    /// One-line role description.
    pub(crate) role: String,

    /// Instruction lines appended to the system prompt in order.
    pub(crate) instructions: Vec<String>,

    /// Model identifier passed to the provider.
    pub(crate) model: String,

    /// The provider that answers for this agent.
    pub(crate) provider: Option<SharedChatProvider>,

    /// External capabilities the agent is described with.
    pub(crate) tools: Vec<ToolKind>,

    /// Specialists exposed to this agent's model as callable functions.
    pub(crate) managed_agents: Vec<Arc<Self>>,

    /// Maximum number of reasoning steps before the runner aborts.
    pub(crate) max_steps: usize,

    /// Whether delegation records are shown alongside the answer.
    pub(crate) show_tool_calls: bool,

    /// Whether the model is asked to answer in markdown.
    pub(crate) markdown: bool,

    /// Description used as the function description when managed.
    pub(crate) description: String,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("instructions", &self.instructions)
            .field("model", &self.model)
            .field("provider", &self.provider.is_some())
            .field("tools", &self.tools)
            .field(
                "managed_agents",
                &self
                    .managed_agents
                    .iter()
                    .map(|a| &a.name)
                    .collect::<Vec<_>>(),
            )
            .field("max_steps", &self.max_steps)
            .field("show_tool_calls", &self.show_tool_calls)
            .field("markdown", &self.markdown)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Default maximum number of reasoning steps.
    pub const DEFAULT_MAX_STEPS: usize = 10;

    /// Create a new agent with the given name and defaults.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: format!("Agent: {name}"),
            name,
            role: String::new(),
            instructions: Vec::new(),
            model: String::new(),
            provider: None,
            tools: Vec::new(),
            managed_agents: Vec::new(),
            max_steps: Self::DEFAULT_MAX_STEPS,
            show_tool_calls: false,
            markdown: false,
        }
    }

    /// Set the role description. Also used as the managed-agent description.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self.description.clone_from(&self.role);
        self
    }

    /// Append one instruction line.
    #[must_use]
    pub fn instruction(mut self, line: impl Into<String>) -> Self {
        self.instructions.push(line.into());
        self
    }

    /// Replace all instruction lines.
    #[must_use]
    pub fn instructions<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the provider.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool identifiers.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolKind>) -> Self {
        self.tools = tools;
        self
    }

    /// Add a managed specialist.
    #[must_use]
    pub fn managed_agent(mut self, agent: Arc<Self>) -> Self {
        self.managed_agents.push(agent);
        self
    }

    /// Set all managed specialists.
    #[must_use]
    pub fn managed_agents(mut self, agents: Vec<Arc<Self>>) -> Self {
        self.managed_agents = agents;
        self
    }

    /// Set the maximum number of reasoning steps.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Show delegation records alongside the answer.
    #[must_use]
    pub const fn show_tool_calls(mut self, show: bool) -> Self {
        self.show_tool_calls = show;
        self
    }

    /// Ask the model to format its answers in markdown.
    #[must_use]
    pub const fn markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Returns the agent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the role description.
    #[must_use]
    pub fn get_role(&self) -> &str {
        &self.role
    }

    /// Returns the instruction lines.
    #[must_use]
    pub fn get_instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn get_model(&self) -> &str {
        &self.model
    }

    /// Returns the tool identifiers.
    #[must_use]
    pub fn get_tools(&self) -> &[ToolKind] {
        &self.tools
    }

    /// Returns the managed specialists.
    #[must_use]
    pub fn get_managed_agents(&self) -> &[Arc<Self>] {
        &self.managed_agents
    }

    /// Returns the maximum number of reasoning steps.
    #[must_use]
    pub const fn get_max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns whether delegation records should be displayed.
    #[must_use]
    pub const fn shows_tool_calls(&self) -> bool {
        self.show_tool_calls
    }

    /// Returns whether markdown output is requested.
    #[must_use]
    pub const fn is_markdown(&self) -> bool {
        self.markdown
    }

    /// Returns `true` if a provider is configured.
    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Build the system prompt from name, role, instructions, tools and
    /// display flags.
    #[must_use]
    pub fn resolve_instructions(&self) -> String {
        let mut prompt = String::with_capacity(256);
        let _ = writeln!(prompt, "You are {}.", self.name);
        if !self.role.is_empty() {
            let _ = writeln!(prompt, "Your role: {}", self.role);
        }

        let lines: Vec<&str> = self
            .instructions
            .iter()
            .flat_map(|i| i.lines())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if !lines.is_empty() {
            prompt.push_str("\nInstructions:\n");
            for line in lines {
                let _ = writeln!(prompt, "{line}");
            }
        }

        if !self.tools.is_empty() {
            let labels: Vec<&str> = self.tools.iter().map(ToolKind::label).collect();
            let _ = writeln!(prompt, "\nConfigured tools: {}", labels.join(", "));
        }

        if !self.managed_agents.is_empty() {
            prompt.push_str("\nTeam members you can delegate to:\n");
            for member in &self.managed_agents {
                let _ = writeln!(
                    prompt,
                    "- {} (call `{}`): {}",
                    member.name,
                    member.tool_name(),
                    member.description
                );
            }
        }

        if self.markdown {
            prompt.push_str("\nUse markdown to format your answers.\n");
        }

        prompt.trim_end().to_owned()
    }

    /// Function name under which this agent is exposed when managed.
    ///
    /// Lowercase ASCII alphanumerics with `_` for every other run of
    /// characters, so `"HackerNews Scout"` becomes `hackernews_scout`.
    #[must_use]
    pub fn tool_name(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        }
        while slug.ends_with('_') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("agent");
        }
        slug
    }

    /// Build a [`ToolDefinition`] for this agent when used as a managed
    /// specialist.
    ///
    /// The definition exposes a single `task` string parameter, which the
    /// coordinating model fills in to describe the work to delegate.
    #[must_use]
    pub fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.tool_name(),
            format!("{}: {}", self.name, self.description),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "task": {
                        "type": "string",
                        "description": "The task to delegate: a one-line goal, input constraints and the required output format."
                    }
                },
                "required": ["task"],
                "additionalProperties": false
            }),
        )
    }

    /// Run this agent to completion with the given input.
    ///
    /// Convenience wrapper around [`Runner::run`](super::Runner::run).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`](crate::Error::Agent) if no provider is
    /// configured, or propagates errors from the run.
    pub fn run<'a>(
        &'a self,
        input: impl Into<String>,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        super::Runner::run(self, input, config)
    }
}

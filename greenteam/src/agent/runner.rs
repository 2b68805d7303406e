//! Runner, the agent execution engine.
//!
//! The [`Runner`] drives an [`Agent`] through its reasoning loop:
//!
//! 1. Build messages from the system prompt and the user input
//! 2. Call the model, offering managed specialists as functions
//! 3. Classify the response into a [`NextStep`]
//! 4. Run the requested specialists and append their answers
//! 5. Loop back to step 2
//!
//! The loop terminates when the model produces a plain answer, an error
//! occurs, or the step limit is exceeded. An agent without managed
//! specialists is offered no functions, so its run is a single completion.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{AgentError, Error, Result};
use crate::message::Message;
use crate::tool::ToolDefinition;
use crate::usage::Usage;

use super::config::Agent;
use super::result::{RunConfig, RunResult, StepInfo, ToolCallRecord, ToolCallRequest};

/// How the run proceeds after one model response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NextStep {
    /// The model answered; the run is complete.
    FinalOutput { output: Value },
    /// The model asked for delegations.
    ToolCalls { calls: Vec<ToolCallRequest> },
}

enum StepOutcome {
    Done(RunResult),
    Continue,
}

/// Mutable state of a single run.
struct RunState<'a> {
    agent: &'a Agent,
    provider: &'a dyn ChatProvider,
    messages: Vec<Message>,
    step_history: Vec<StepInfo>,
    cumulative_usage: Usage,
    definitions: Vec<ToolDefinition>,
    max_steps: usize,
}

impl<'a> RunState<'a> {
    fn init(agent: &'a Agent, input: String, config: &RunConfig) -> Result<Self> {
        let provider = agent.provider.as_deref().ok_or_else(|| {
            AgentError::runtime(format!(
                "Agent '{}' has no provider configured. Call .provider() before running.",
                agent.name
            ))
        })?;

        let mut messages = Vec::with_capacity(2);
        let system_prompt = agent.resolve_instructions();
        if !system_prompt.is_empty() {
            messages.push(Message::system(system_prompt));
        }
        messages.push(Message::user(input));

        let definitions: Vec<ToolDefinition> = agent
            .managed_agents
            .iter()
            .map(|a| a.tool_definition())
            .collect();

        let tool_names: Vec<&str> = definitions.iter().map(ToolDefinition::name).collect();
        tracing::Span::current().record("agent.tools", tracing::field::debug(&tool_names));

        Ok(Self {
            agent,
            provider,
            messages,
            step_history: Vec::new(),
            cumulative_usage: Usage::zero(),
            definitions,
            max_steps: config.max_steps.unwrap_or(agent.max_steps),
        })
    }

    fn accumulate_usage(&mut self, response: &ChatResponse) {
        if let Some(usage) = response.usage {
            self.cumulative_usage += usage;
        }
    }

    async fn process_step(&mut self, step: usize, response: ChatResponse) -> StepOutcome {
        match Runner::classify_response(&response) {
            NextStep::FinalOutput { output } => {
                self.messages.push(response.message.clone());
                self.step_history.push(StepInfo {
                    step,
                    response,
                    tool_calls: Vec::new(),
                });

                tracing::Span::current().record("agent.result_steps", step);
                info!(
                    agent = %self.agent.name,
                    steps = step,
                    input_tokens = self.cumulative_usage.input_tokens,
                    output_tokens = self.cumulative_usage.output_tokens,
                    "Agent run completed",
                );

                StepOutcome::Done(RunResult {
                    output,
                    usage: self.cumulative_usage,
                    steps: step,
                    step_history: std::mem::take(&mut self.step_history),
                    agent_name: self.agent.name.clone(),
                })
            }

            NextStep::ToolCalls { calls } => {
                self.messages.push(response.message.clone());

                let records =
                    Runner::execute_tool_calls(&calls, self.agent, &mut self.messages).await;

                for record in &records {
                    self.cumulative_usage += record.usage;
                }

                self.step_history.push(StepInfo {
                    step,
                    response,
                    tool_calls: records.into_iter().map(|r| r.record).collect(),
                });

                StepOutcome::Continue
            }
        }
    }
}

/// A finished delegation plus the tokens the specialist spent on it.
struct Delegation {
    record: ToolCallRecord,
    usage: Usage,
}

/// Stateless execution engine for [`Agent`]s.
///
/// All per-run state lives inside the run future, so the same agent can be
/// run concurrently with different inputs.
#[derive(Debug, Clone, Copy)]
pub struct Runner;

impl Runner {
    /// Execute an agent run to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`] if no provider is configured or the step
    /// limit is exceeded, and propagates provider errors from the model call.
    pub fn run<'a>(
        agent: &'a Agent,
        input: impl Into<String>,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        let input = input.into();
        let span = info_span!(
            "agent",
            agent.name = %agent.name,
            agent.model = %agent.model,
            gen_ai.system = "greenteam",
            agent.max_steps = agent.max_steps,
            agent.tools = tracing::field::Empty,
            agent.result_steps = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        Box::pin(Self::run_inner(agent, input, config).instrument(span))
    }

    async fn run_inner(agent: &Agent, input: String, config: RunConfig) -> Result<RunResult> {
        let mut state = RunState::init(agent, input, &config)?;

        for step in 1..=state.max_steps {
            debug!(agent = %agent.name, step, "Starting step");

            let request = Self::build_request(agent, &state.messages, &state.definitions);
            let response = state.provider.chat(&request).await.map_err(|e| {
                error!(error = %e, agent = %agent.name, step, "LLM call failed");
                tracing::Span::current().record("error", tracing::field::display(&e));
                e
            })?;

            state.accumulate_usage(&response);

            match state.process_step(step, response).await {
                StepOutcome::Done(result) => return Ok(result),
                StepOutcome::Continue => {}
            }
        }

        let err = Error::from(AgentError::max_steps(state.max_steps));
        error!(error = %err, agent = %agent.name, max_steps = state.max_steps, "Max steps exceeded");
        tracing::Span::current().record("error", tracing::field::display(&err));
        Err(err)
    }

    fn build_request(
        agent: &Agent,
        messages: &[Message],
        definitions: &[ToolDefinition],
    ) -> ChatRequest {
        let mut request = ChatRequest::with_messages(&agent.model, messages.to_vec());
        if !definitions.is_empty() {
            request = request
                .tools(definitions.to_vec())
                .parallel_tool_calls(true);
        }
        request
    }

    pub(crate) fn classify_response(response: &ChatResponse) -> NextStep {
        if let Some(tool_calls) = response.tool_calls() {
            let calls: Vec<ToolCallRequest> =
                tool_calls.iter().map(ToolCallRequest::from).collect();
            if !calls.is_empty() {
                return NextStep::ToolCalls { calls };
            }
        }

        let output = response.text().map_or(Value::Null, Value::String);
        NextStep::FinalOutput { output }
    }

    /// Execute delegations concurrently and append their answers to the
    /// conversation.
    ///
    /// Every call of the step runs at once with [`futures::future::join_all`],
    /// preserving call order.
    async fn execute_tool_calls(
        calls: &[ToolCallRequest],
        agent: &Agent,
        messages: &mut Vec<Message>,
    ) -> Vec<Delegation> {
        let futs = calls.iter().map(|call| Self::execute_single_tool(call, agent));
        let delegations = futures::future::join_all(futs).await;

        for d in &delegations {
            messages.push(Message::tool(&d.record.id, &d.record.result));
        }

        delegations
    }

    async fn execute_single_tool(call: &ToolCallRequest, agent: &Agent) -> Delegation {
        let tool_span = info_span!(
            "tool",
            tool.name = %call.name,
            tool.id = %call.id,
            tool.input = %call.arguments,
            tool.success = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        async {
            let (result, success, usage) = match agent
                .managed_agents
                .iter()
                .find(|a| a.tool_name() == call.name || a.name == call.name)
            {
                Some(sub) => Self::dispatch_managed_agent(&agent.name, sub, &call.arguments).await,
                None => {
                    warn!(tool = %call.name, "Tool not found");
                    (format!("Tool '{}' not found", call.name), false, Usage::zero())
                }
            };

            let current = tracing::Span::current();
            current.record("tool.success", success);
            if !success {
                current.record("error", result.as_str());
            }

            Delegation {
                record: ToolCallRecord {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    result,
                    success,
                },
                usage,
            }
        }
        .instrument(tool_span)
        .await
    }

    /// Run a managed specialist on the `task` argument.
    async fn dispatch_managed_agent(
        from: &str,
        sub_agent: &Agent,
        args: &Value,
    ) -> (String, bool, Usage) {
        let Some(task) = args.get("task").and_then(Value::as_str) else {
            warn!(to_agent = %sub_agent.name, "Delegation without a task argument");
            return (
                format!("Call to '{}' is missing the `task` argument", sub_agent.tool_name()),
                false,
                Usage::zero(),
            );
        };

        info!(from_agent = %from, to_agent = %sub_agent.name, "Handoff to managed agent");

        match Self::run(sub_agent, task, RunConfig::default()).await {
            Ok(result) => {
                let output = match result.output {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                (output, true, result.usage)
            }
            Err(e) => (
                format!("Managed agent '{}' failed: {e}", sub_agent.name),
                false,
                Usage::zero(),
            ),
        }
    }
}

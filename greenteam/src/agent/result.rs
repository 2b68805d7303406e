//! Run configuration and result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::ChatResponse;
use crate::message::ToolCall;
use crate::usage::Usage;

/// Per-run overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunConfig {
    /// Overrides the agent's own step limit.
    pub max_steps: Option<usize>,
}

impl RunConfig {
    /// Set the step limit for this run.
    #[must_use]
    pub const fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// A function call requested by the model, with parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Provider-assigned call ID.
    pub id: String,
    /// Function name.
    pub name: String,
    /// Parsed JSON arguments.
    pub arguments: Value,
}

impl From<&ToolCall> for ToolCallRequest {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: call.arguments_value(),
        }
    }
}

/// Outcome of one executed function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Provider-assigned call ID.
    pub id: String,
    /// Function name as called by the model.
    pub name: String,
    /// Arguments the model supplied.
    pub arguments: Value,
    /// Text fed back to the model.
    pub result: String,
    /// Whether the call succeeded.
    pub success: bool,
}

/// What happened in one reasoning step.
#[derive(Debug, Clone)]
pub struct StepInfo {
    /// 1-based step number.
    pub step: usize,
    /// The model response for this step.
    pub response: ChatResponse,
    /// Calls executed in this step, in call order.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Result of a completed agent run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Final output. A string for text answers, `Null` when the model
    /// returned no content.
    pub output: Value,
    /// Token usage summed over every step.
    pub usage: Usage,
    /// Number of steps taken.
    pub steps: usize,
    /// Per-step history.
    pub step_history: Vec<StepInfo>,
    /// Name of the agent that produced the output.
    pub agent_name: String,
}

impl RunResult {
    /// Returns the output as text when it is a JSON string.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.output.as_str()
    }

    /// Text content of the last model message in the run.
    #[must_use]
    pub fn last_message_text(&self) -> Option<&str> {
        self.step_history
            .last()
            .and_then(|s| s.response.message.text())
    }

    /// Every delegation executed during the run, in order.
    #[must_use]
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.step_history
            .iter()
            .flat_map(|s| s.tool_calls.iter().cloned())
            .collect()
    }
}

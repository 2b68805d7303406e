//! Error types for agent runs.

/// Failure of the agent loop itself, as opposed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum AgentError {
    /// The agent cannot run as configured.
    #[error("{0}")]
    Runtime(String),

    /// The step budget ran out before the model produced a final answer.
    #[error("Maximum steps ({max_steps}) reached without final answer")]
    MaxSteps {
        /// The configured step limit.
        max_steps: usize,
    },
}

impl AgentError {
    /// Create a runtime error.
    #[must_use]
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Create a max-steps error.
    #[must_use]
    pub const fn max_steps(max_steps: usize) -> Self {
        Self::MaxSteps { max_steps }
    }
}

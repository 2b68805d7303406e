//! Convenient re-exports.
//!
//! ```rust,ignore
//! use greenteam::prelude::*;
//! ```

pub use crate::agent::{Agent, AgentError, RunConfig, RunResult, Runner, ToolCallRecord};
pub use crate::chat::{ChatProvider, ChatRequest, ChatResponse, SharedChatProvider};
pub use crate::dispatch::{DebugContext, DispatchSettings, Dispatcher, Outcome, Reply};
pub use crate::error::{Error, ErrorKind, LlmError, Result};
pub use crate::llms::{OpenAI, OpenAIConfig};
pub use crate::message::{Message, Role, ToolCall};
pub use crate::mock::MockProvider;
pub use crate::prompt::{RequestContext, RequestForm, Route, SUFFIX, assemble, default_prompt};
pub use crate::registry::{AgentRegistry, COORDINATOR_NAME, Specialist};
pub use crate::tool::{ToolDefinition, ToolKind};
pub use crate::upload::{StoredUpload, Upload, UploadError, UploadNaming, UploadStore};
pub use crate::usage::Usage;

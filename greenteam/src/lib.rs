//! Green Team - a coordinator/specialist agent team for urban sustainability questions.
//!
//! This crate holds everything behind the form: the agent configuration model,
//! an OpenAI-compatible LLM transport (Groq by default), the registry of the
//! four specialists plus their coordinator, prompt assembly, upload storage and
//! the dispatcher that ties a submitted request to exactly one agent run.

pub mod agent;
pub mod chat;
pub mod dispatch;
pub mod error;
pub mod llms;
pub mod message;
pub mod mock;
pub mod prelude;
pub mod prompt;
pub mod registry;
pub mod tool;
pub mod upload;
pub mod usage;

pub use error::{Error, ErrorKind, LlmError, Result};

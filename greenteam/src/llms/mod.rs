//! LLM backend implementations.
//!
//! Only the OpenAI-compatible chat-completions protocol is implemented; Groq
//! is reached through it via [`OpenAIConfig::groq`].

mod error;
pub mod openai;

pub use error::LlmError;
pub use openai::{OpenAI, OpenAIConfig};

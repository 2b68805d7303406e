//! OpenAI-compatible chat-completions backend.
//!
//! Groq serves the same API under `/openai/v1`, so the green team's default
//! provider is this client built from [`OpenAIConfig::groq`].

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;

//! Agents and the runner that executes them.
//!
//! - **[`Agent`]** is an immutable configuration record with its own
//!   provider handle.
//! - **[`Runner`]** is a stateless engine that drives one agent through a
//!   bounded loop (call model, run delegations, repeat).
//! - **Managed agents** are specialists registered via
//!   [`Agent::managed_agent`]; the coordinator's model calls them as
//!   functions taking a `task` string.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use greenteam::agent::{Agent, RunConfig};
//!
//! let news = Arc::new(
//!     Agent::new("News Analyst")
//!         .role("Find recent news on sustainability initiatives")
//!         .model("qwen/qwen3-32b")
//!         .provider(groq.clone()),
//! );
//!
//! let coordinator = Agent::new("Team Coordinator")
//!     .model("qwen/qwen3-32b")
//!     .provider(groq.clone())
//!     .managed_agent(news);
//!
//! let result = coordinator.run("What is new in Lahore?", RunConfig::default()).await?;
//! println!("{}", result.text().unwrap_or("no output"));
//! ```

mod config;
pub mod error;
pub mod result;
mod runner;

pub use config::Agent;
pub use error::AgentError;
pub use result::{RunConfig, RunResult, StepInfo, ToolCallRecord, ToolCallRequest};
pub use runner::Runner;

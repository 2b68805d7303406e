//! Tool identifiers and function definitions.
//!
//! The specialists are configured with a set of external capabilities
//! ([`ToolKind`]). Those capabilities are identifiers only: they describe the
//! agent to the model and to the UI, and none of them is executed here.
//!
//! [`ToolDefinition`] is the function schema sent to the model; the runner
//! uses it to expose managed specialists to the coordinator.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An external capability an agent is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Python code execution.
    Python,
    /// Google web search.
    GoogleSearch,
    /// arXiv paper search.
    Arxiv,
    /// Hacker News stories and comments.
    #[serde(rename = "hackernews")]
    HackerNews,
}

impl ToolKind {
    /// Stable identifier, as used in configuration and JSON.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::GoogleSearch => "google_search",
            Self::Arxiv => "arxiv",
            Self::HackerNews => "hackernews",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::GoogleSearch => "Google Search",
            Self::Arxiv => "arXiv",
            Self::HackerNews => "Hacker News",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Function definition offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Function name. Must match `^[a-zA-Z0-9_-]+$`.
    pub name: String,

    /// Description of what the function does.
    /// This helps the model decide when to call it.
    pub description: String,

    /// JSON schema for the function's parameters.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

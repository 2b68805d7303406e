//! The Green Team: four specialists and the coordinator that leads them.
//!
//! [`AgentRegistry::new`] builds every agent explicitly from a provider and a
//! model identifier. Nothing is constructed at load time.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::agent::Agent;
use crate::chat::SharedChatProvider;
use crate::error::{Error, Result};
use crate::prompt::Route;
use crate::tool::ToolKind;

/// Display name of the coordinator.
pub const COORDINATOR_NAME: &str = "Team Coordinator";

const COORDINATOR_ROLE: &str = "Coordinate a team of specialized agents (Data, News, Policy, HN Scout) \
to answer user requests about green tech and sustainability. Decide who should work, in what order, \
and merge results into one final, cited summary.";

const COORDINATOR_INSTRUCTIONS: [&str; 7] = [
    "1. Deliver a professional, trustworthy answer with clear sources and a short action list.",
    "2. Pick the right specialist(s). If a task spans areas, run them sequentially (e.g., News → Policy) and then synthesize.",
    "3. When delegating, pass a one-line goal + input constraints + required output format.",
    "4. Prefer official sources > reputable media > community posts. If findings conflict, note both and state confidence.",
    "5. Assume timezone Asia/Karachi. Treat “recent” as ≤12 months unless the user says otherwise.",
    "6. Always include links (or identifiers) each specialist returned.",
    "7. Stop when the question is answered with at least two independent sources or when the user asked for a specific operation that’s complete.",
];

/// One of the four single-purpose agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialist {
    /// Environmental dataset analysis.
    DataAnalysis,
    /// Sustainability news.
    News,
    /// Government policy summaries.
    Policy,
    /// Green tech ideas from Hacker News.
    HackerNewsScout,
}

impl Specialist {
    /// All specialists in display order.
    pub const ALL: [Self; 4] = [
        Self::DataAnalysis,
        Self::News,
        Self::Policy,
        Self::HackerNewsScout,
    ];

    /// Exact display name, as used by the specialist selector.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::DataAnalysis => "Data Analysis Agent",
            Self::News => "News Analyst",
            Self::Policy => "Policy Reviewer",
            Self::HackerNewsScout => "HackerNews Scout",
        }
    }

    const fn role(self) -> &'static str {
        match self {
            Self::DataAnalysis => "Analyze environmental datasets (mock or real CSV)",
            Self::News => "Find recent news on sustainability initiatives",
            Self::Policy => "Summarize government policies",
            Self::HackerNewsScout => "Find innovative green tech ideas",
        }
    }

    const fn instruction(self) -> &'static str {
        match self {
            Self::DataAnalysis => "Read CSV with air quality data, summarize trends",
            Self::News => "Search for city-level green project in the last year",
            Self::Policy => "Search official sites for city policy updates",
            Self::HackerNewsScout => "Search for “urban sustainability tech”",
        }
    }

    fn tools(self) -> Vec<ToolKind> {
        match self {
            Self::DataAnalysis => vec![ToolKind::Python, ToolKind::GoogleSearch],
            Self::News | Self::Policy => vec![ToolKind::Arxiv, ToolKind::GoogleSearch],
            Self::HackerNewsScout => vec![ToolKind::HackerNews, ToolKind::GoogleSearch],
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::DataAnalysis => 0,
            Self::News => 1,
            Self::Policy => 2,
            Self::HackerNewsScout => 3,
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Specialist {
    type Err = Error;

    /// Matches the display name exactly. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|sp| sp.display_name() == s)
            .ok_or_else(|| Error::validation(format!("unknown specialist '{s}'")))
    }
}

/// The five configured agents.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    specialists: [Arc<Agent>; 4],
    coordinator: Arc<Agent>,
}

impl AgentRegistry {
    /// Build the team on the given provider and model.
    #[must_use]
    pub fn new(provider: SharedChatProvider, model: impl Into<String>) -> Self {
        Self::build(Some(provider), &model.into())
    }

    /// Build the team without a provider.
    ///
    /// The configuration records are complete and can be listed, but running
    /// any agent fails with a runtime error.
    #[must_use]
    pub fn unconnected(model: impl Into<String>) -> Self {
        Self::build(None, &model.into())
    }

    fn build(provider: Option<SharedChatProvider>, model: &str) -> Self {
        let attach = |agent: Agent| match &provider {
            Some(p) => agent.provider(Arc::clone(p)),
            None => agent,
        };

        let specialists = Specialist::ALL.map(|sp| {
            Arc::new(attach(
                Agent::new(sp.display_name())
                    .role(sp.role())
                    .instruction(sp.instruction())
                    .tools(sp.tools())
                    .model(model)
                    .show_tool_calls(true)
                    .markdown(true),
            ))
        });

        let coordinator = Arc::new(attach(
            Agent::new(COORDINATOR_NAME)
                .role(COORDINATOR_ROLE)
                .instructions(COORDINATOR_INSTRUCTIONS)
                .model(model)
                .managed_agents(specialists.to_vec())
                .show_tool_calls(true)
                .markdown(true),
        ));

        Self {
            specialists,
            coordinator,
        }
    }

    /// Set the step limit of every agent.
    #[must_use]
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        let specialists = self
            .specialists
            .map(|a| Arc::new(Agent::clone(&a).max_steps(max_steps)));
        let coordinator = Arc::new(
            Agent::clone(&self.coordinator)
                .max_steps(max_steps)
                .managed_agents(specialists.to_vec()),
        );
        Self {
            specialists,
            coordinator,
        }
    }

    /// The agent for one specialist.
    #[must_use]
    pub fn get(&self, specialist: Specialist) -> &Arc<Agent> {
        &self.specialists[specialist.index()]
    }

    /// The coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<Agent> {
        &self.coordinator
    }

    /// The agent a route targets.
    #[must_use]
    pub fn resolve(&self, route: &Route) -> &Arc<Agent> {
        match route {
            Route::Coordinator => &self.coordinator,
            Route::Specialist(sp) => self.get(*sp),
        }
    }

    /// Specialists in display order.
    pub fn specialists(&self) -> impl Iterator<Item = (Specialist, &Arc<Agent>)> {
        Specialist::ALL.into_iter().zip(self.specialists.iter())
    }

    /// Every agent, coordinator first.
    pub fn all(&self) -> impl Iterator<Item = &Arc<Agent>> {
        std::iter::once(&self.coordinator).chain(self.specialists.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    fn registry() -> AgentRegistry {
        AgentRegistry::new(Arc::new(MockProvider::with_texts(["ok"])), "qwen/qwen3-32b")
    }

    #[test]
    fn selection_matches_display_name() {
        let reg = registry();
        for sp in Specialist::ALL {
            let parsed: Specialist = sp.display_name().parse().unwrap();
            assert_eq!(parsed, sp);
            assert_eq!(reg.resolve(&Route::Specialist(parsed)).name(), sp.display_name());
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["Hackernews Team", "news analyst", "", "Team Coordinator"] {
            let err = name.parse::<Specialist>().unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::InvalidRequest);
        }
    }

    #[test]
    fn specialist_configuration() {
        let reg = registry();
        let data = reg.get(Specialist::DataAnalysis);
        assert_eq!(data.get_role(), "Analyze environmental datasets (mock or real CSV)");
        assert_eq!(data.get_tools(), &[ToolKind::Python, ToolKind::GoogleSearch]);
        assert_eq!(data.get_model(), "qwen/qwen3-32b");
        assert!(data.shows_tool_calls() && data.is_markdown());

        let scout = reg.get(Specialist::HackerNewsScout);
        assert_eq!(scout.get_tools(), &[ToolKind::HackerNews, ToolKind::GoogleSearch]);
    }

    #[test]
    fn coordinator_references_every_specialist() {
        let reg = registry();
        let coord = reg.coordinator();
        assert_eq!(coord.name(), COORDINATOR_NAME);
        assert_eq!(coord.get_instructions().len(), 7);
        assert!(coord.get_tools().is_empty());

        let members: Vec<&str> = coord.get_managed_agents().iter().map(|a| a.name()).collect();
        assert_eq!(
            members,
            ["Data Analysis Agent", "News Analyst", "Policy Reviewer", "HackerNews Scout"]
        );
        for (sp, agent) in reg.specialists() {
            assert!(Arc::ptr_eq(agent, &coord.get_managed_agents()[sp.index()]));
        }
    }

    #[tokio::test]
    async fn unconnected_team_lists_but_does_not_run() {
        let reg = AgentRegistry::unconnected("qwen/qwen3-32b");
        assert_eq!(reg.all().count(), 5);
        assert!(reg.all().all(|a| !a.has_provider()));

        let err = reg
            .coordinator()
            .run("hello", crate::agent::RunConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvocationFailed);
    }

    #[test]
    fn max_steps_applies_to_the_whole_team() {
        let reg = registry().with_max_steps(3);
        assert_eq!(reg.coordinator().get_max_steps(), 3);
        assert!(reg.all().all(|a| a.get_max_steps() == 3));
        assert!(
            reg.coordinator()
                .get_managed_agents()
                .iter()
                .all(|a| a.get_max_steps() == 3)
        );
    }
}

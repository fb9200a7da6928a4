//! Agent identity and the tournament roster.

use std::hash::Hash;
use std::sync::Arc;

use anyhow::bail;

use crate::agent_interface::{AgentFactory, AgentProvider};

/// One registered tournament participant: a unique name bound to a factory
/// that can re-instantiate the agent for every match repetition.
pub struct Agent {
    /// Unique display name, used in logs, artifacts and the score table.
    pub name: String,
    /// Registration index; ranking ties are broken by this order.
    pub id: u32,
    factory: Box<dyn AgentFactory>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}

impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Agent {}

impl Hash for Agent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.id.hash(state);
    }
}

impl Agent {
    /// Builds a fresh, zero-state provider instance for one match.
    pub fn instantiate(&self) -> Box<dyn AgentProvider> {
        self.factory.new_agent()
    }
}

/// The set of agents entering one tournament, in discovery order.
///
/// Registration order matters: it is the tie-break order of the final
/// ranking. Names must be unique.
#[derive(Debug, Default)]
pub struct Roster {
    agents: Vec<Arc<Agent>>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent under `name`.
    ///
    /// # Errors
    /// Returned when `name` is already taken or empty.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl AgentFactory + 'static,
    ) -> anyhow::Result<()> {
        let name = name.into();
        if name.is_empty() {
            bail!("agent name must not be empty");
        }
        if self.agents.iter().any(|a| a.name == name) {
            bail!("agent name '{name}' is already registered");
        }
        let id = self.agents.len() as u32;
        self.agents.push(Arc::new(Agent {
            name,
            id,
            factory: Box::new(factory),
        }));
        Ok(())
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub(crate) fn into_agents(self) -> Vec<Arc<Agent>> {
        self.agents
    }
}

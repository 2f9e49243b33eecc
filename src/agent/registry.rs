use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::Result;
use crate::store::LeadStore;

use super::config::{AgentConfig, AgentRole};

/// Holds the configured agent roles. Insertion order is preserved so that
/// lookups are deterministic; the set only changes through explicit reload.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<Vec<AgentConfig>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: Vec<AgentConfig>) -> Self {
        Self {
            agents: RwLock::new(agents),
        }
    }

    /// Replaces the agent set from the store's active configurations.
    pub async fn reload(&self, store: &dyn LeadStore) -> Result<usize> {
        let agents = store.list_agent_configs(true).await?;
        let count = agents.len();
        *self.agents.write() = agents;
        info!(count, "agent registry reloaded");
        Ok(count)
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentConfig> {
        self.agents.read().iter().find(|a| a.id == agent_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// Picks the active agent of `role` for a legal area: exact
    /// specialization match first, then a wildcard agent, then the first
    /// active agent of that role. Ties break by insertion order.
    pub fn find_best_agent(&self, role: AgentRole, specialization: &str) -> Option<AgentConfig> {
        let agents = self.agents.read();
        let mut of_role = agents.iter().filter(|a| a.role == role && a.active);

        if let Some(exact) = of_role
            .clone()
            .find(|a| a.specialization == specialization)
        {
            return Some(exact.clone());
        }
        if let Some(general) = of_role.clone().find(|a| a.is_general()) {
            return Some(general.clone());
        }
        of_role.next().cloned()
    }

    pub fn snapshot(&self) -> Vec<AgentConfig> {
        self.agents.read().clone()
    }
}

pub type SharedAgentRegistry = Arc<AgentRegistry>;

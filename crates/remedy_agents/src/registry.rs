//! Agent registry keyed by error category.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use remedy_core::ErrorCategory;

use crate::traits::RemediationAgent;

/// Maps each category to the one agent that handles it.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<ErrorCategory, Arc<dyn RemediationAgent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
        }
    }

    /// Register an agent under its own category, replacing any previous one.
    pub fn register(&mut self, agent: Arc<dyn RemediationAgent>) {
        let category = agent.category();
        debug!("Registering {} for {}", agent.name(), category);
        self.agents.insert(category, agent);
    }

    pub fn get(&self, category: ErrorCategory) -> Option<Arc<dyn RemediationAgent>> {
        self.agents.get(&category).cloned()
    }

    pub fn contains(&self, category: ErrorCategory) -> bool {
        self.agents.contains_key(&category)
    }

    /// Registered agents in category priority order.
    pub fn agents(&self) -> Vec<Arc<dyn RemediationAgent>> {
        ErrorCategory::all()
            .iter()
            .filter_map(|category| self.get(*category))
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.agents().iter().map(|agent| agent.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn unregister(&mut self, category: ErrorCategory) -> Option<Arc<dyn RemediationAgent>> {
        debug!("Unregistering agent for {}", category);
        self.agents.remove(&category)
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}

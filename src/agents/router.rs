use crate::agents::{Agent, AgentRegistry};
use crate::types::Subtask;
use std::sync::Arc;

/// Routes subtasks to specialist agents.
///
/// First match wins: the registry is walked in registration order and the
/// first agent whose `can_handle` accepts the subtask is chosen. There is no
/// fallback, load balancing or retry across agents.
#[derive(Clone)]
pub struct AgentRouter {
    registry: Arc<AgentRegistry>,
}

impl AgentRouter {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Select the agent for a subtask, or `None` if nobody accepts it.
    pub fn select(&self, subtask: &Subtask) -> Option<Arc<dyn Agent>> {
        let selected = self
            .registry
            .agents()
            .iter()
            .find(|agent| agent.can_handle(subtask))
            .cloned();

        match &selected {
            Some(agent) => tracing::debug!(
                "Routing '{}' subtask to agent '{}'",
                subtask.task_type,
                agent.name()
            ),
            None => tracing::debug!("No agent accepts '{}' subtask", subtask.task_type),
        }

        selected
    }
}

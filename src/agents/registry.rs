//! Capability registry
//!
//! The ordered set of specialist agents known to the supervisor. The registry
//! is assembled once, before the supervisor is constructed, and is read-only
//! afterwards so it can be shared between concurrent `process` calls.
//!
//! Registration order matters: routing picks the first agent that accepts a
//! subtask.

use crate::agents::{Agent, ConfigurableAgent};
use crate::llm::LLMClient;
use crate::utils::toml_config::AgentConfig;
use std::sync::Arc;

/// Immutable, ordered collection of specialist agents
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Create a registry from agents in registration order
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Self {
        Self { agents }
    }

    /// A registry with no agents; every subtask is skipped
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> AgentRegistryBuilder {
        AgentRegistryBuilder::default()
    }

    /// Build one [`ConfigurableAgent`] per `[[agents]]` entry, all sharing one gateway
    pub fn from_config(configs: &[AgentConfig], llm: Arc<dyn LLMClient>) -> Self {
        configs
            .iter()
            .fold(Self::builder(), |builder, config| {
                builder.register(Arc::new(ConfigurableAgent::new(config, Arc::clone(&llm))))
            })
            .build()
    }

    /// Agents in registration order
    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn agent_names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Agent>> {
        self.agents.iter().find(|a| a.name() == name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Builder for [`AgentRegistry`]
#[derive(Default)]
pub struct AgentRegistryBuilder {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentRegistryBuilder {
    /// Append an agent; earlier registrations win routing ties
    pub fn register(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn build(self) -> AgentRegistry {
        AgentRegistry::new(self.agents)
    }
}

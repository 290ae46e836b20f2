pub mod configurable;
pub mod registry;
pub mod router;

use crate::types::{Result, Subtask, SubtaskResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use configurable::ConfigurableAgent;
pub use registry::{AgentRegistry, AgentRegistryBuilder};
pub use router::AgentRouter;

/// Base trait for all specialist agents
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name used in reflection reports and logs
    fn name(&self) -> &str;

    /// Whether this agent accepts the subtask's declared type
    fn can_handle(&self, subtask: &Subtask) -> bool;

    /// Work on a single subtask
    async fn process(&self, subtask: &Subtask) -> Result<SubtaskResult>;

    /// Outcome of the most recent `process` call, if the agent tracks one
    fn last_task_success(&self) -> Option<bool> {
        None
    }
}

/// The specialist roles of the research fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Generator,
    Reflector,
    Ranker,
    Evolver,
    MetaReviewer,
    #[serde(untagged)]
    Custom(String),
}

impl AgentKind {
    pub fn from_string(name: &str) -> Self {
        match name.to_lowercase().replace('-', "_").as_str() {
            "generator" => AgentKind::Generator,
            "reflector" => AgentKind::Reflector,
            "ranker" => AgentKind::Ranker,
            "evolver" => AgentKind::Evolver,
            "meta_reviewer" => AgentKind::MetaReviewer,
            _ => AgentKind::Custom(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AgentKind::Generator => "generator",
            AgentKind::Reflector => "reflector",
            AgentKind::Ranker => "ranker",
            AgentKind::Evolver => "evolver",
            AgentKind::MetaReviewer => "meta_reviewer",
            AgentKind::Custom(name) => name,
        }
    }

    /// Subtask type this role takes when the configuration lists none.
    pub fn default_task_type(&self) -> &str {
        match self {
            AgentKind::Generator => "generate_hypothesis",
            AgentKind::Reflector => "evaluate_hypothesis",
            AgentKind::Ranker => "rank_hypothesis",
            AgentKind::Evolver => "evolve_hypothesis",
            AgentKind::MetaReviewer => "meta_review",
            AgentKind::Custom(name) => name,
        }
    }

    pub fn default_system_prompt(&self) -> String {
        match self {
            AgentKind::Generator => r#"You are a Generator Agent in a research team.
Propose novel, testable hypotheses grounded in the literature."#
                .to_string(),
            AgentKind::Reflector => r#"You are a Reflector Agent in a research team.
Critically evaluate hypotheses for correctness, novelty and feasibility."#
                .to_string(),
            AgentKind::Ranker => r#"You are a Ranker Agent in a research team.
Compare hypotheses and order them by expected scientific value."#
                .to_string(),
            AgentKind::Evolver => r#"You are an Evolver Agent in a research team.
Refine and combine hypotheses to address their weaknesses."#
                .to_string(),
            AgentKind::MetaReviewer => r#"You are a Meta-Reviewer Agent in a research team.
Summarize reviews and identify recurring issues across the work."#
                .to_string(),
            AgentKind::Custom(name) => format!("You are a {} agent in a research team.", name),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

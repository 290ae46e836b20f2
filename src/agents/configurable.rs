//! Configurable Agent implementation
//!
//! A generic LLM-backed specialist whose role, accepted subtask types and
//! system prompt come from an `[[agents]]` entry in the configuration file.

use crate::agents::{Agent, AgentKind};
use crate::llm::LLMClient;
use crate::types::{Result, Subtask, SubtaskResult};
use crate::utils::toml_config::AgentConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

/// A specialist agent that derives its behavior from configuration
pub struct ConfigurableAgent {
    name: String,
    kind: AgentKind,
    llm: Arc<dyn LLMClient>,
    system_prompt: String,
    /// Subtask types accepted by `can_handle`
    handles: Vec<String>,
    last_success: Mutex<Option<bool>>,
}

impl ConfigurableAgent {
    /// Create a new configurable agent from its `[[agents]]` entry
    pub fn new(config: &AgentConfig, llm: Arc<dyn LLMClient>) -> Self {
        let kind = config
            .kind
            .clone()
            .unwrap_or_else(|| AgentKind::from_string(&config.name));
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| kind.default_system_prompt());
        let handles = if config.handles.is_empty() {
            vec![kind.default_task_type().to_string()]
        } else {
            config.handles.clone()
        };

        Self::with_params(&config.name, kind, llm, system_prompt, handles)
    }

    /// Create a new configurable agent with explicit parameters
    pub fn with_params(
        name: &str,
        kind: AgentKind,
        llm: Arc<dyn LLMClient>,
        system_prompt: String,
        handles: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            llm,
            system_prompt,
            handles,
            last_success: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn build_prompt(subtask: &Subtask) -> String {
        let resources = if subtask.resources.is_empty() {
            "none specified".to_string()
        } else {
            subtask.resources.join(", ")
        };

        format!(
            "Subtask type: {}\nGoal: {}\nAvailable resources: {}\n\nComplete the goal and report your findings.",
            subtask.task_type, subtask.goal, resources
        )
    }
}

#[async_trait]
impl Agent for ConfigurableAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, subtask: &Subtask) -> bool {
        self.handles
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&subtask.task_type))
    }

    async fn process(&self, subtask: &Subtask) -> Result<SubtaskResult> {
        let prompt = Self::build_prompt(subtask);
        let outcome = self
            .llm
            .generate_with_system(&self.system_prompt, &prompt)
            .await;

        *self.last_success.lock() = Some(outcome.is_ok());

        let output = outcome?;
        Ok(json!({
            "agent": self.name,
            "type": subtask.task_type,
            "goal": subtask.goal,
            "output": output,
        }))
    }

    fn last_task_success(&self) -> Option<bool> {
        *self.last_success.lock()
    }
}

//! Fleet reflection
//!
//! A read-only pass over the registry: per-agent status, the performance
//! metrics snapshot and a list of improvement suggestions. The suggestions are
//! either a static list or, when enabled, produced by one gateway call.

use super::with_deadline;
use crate::agents::AgentRegistry;
use crate::llm::LLMClient;
use crate::types::{AgentStatus, AppError, PerformanceMetrics, ReflectionReport, Result};
use crate::utils::toml_config::SupervisorSettings;
use std::collections::BTreeMap;
use std::time::Duration;

pub fn default_suggestions() -> Vec<String> {
    vec![
        "Add agents for more specialized research domains".to_string(),
        "Refine the task decomposition strategy".to_string(),
        "Improve the result integration method".to_string(),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionSource {
    Static(Vec<String>),
    /// Ask the gateway; `fallback` is used when it answers with nothing usable
    Model { fallback: Vec<String> },
}

pub struct ReflectionModule {
    source: SuggestionSource,
    call_timeout: Option<Duration>,
}

impl Default for ReflectionModule {
    fn default() -> Self {
        Self::new(SuggestionSource::Static(default_suggestions()), None)
    }
}

impl ReflectionModule {
    pub fn new(source: SuggestionSource, call_timeout: Option<Duration>) -> Self {
        Self {
            source,
            call_timeout,
        }
    }

    pub fn from_settings(settings: &SupervisorSettings) -> Self {
        let source = if settings.dynamic_suggestions {
            SuggestionSource::Model {
                fallback: settings.suggestions.clone(),
            }
        } else {
            SuggestionSource::Static(settings.suggestions.clone())
        };

        Self::new(source, settings.call_timeout())
    }

    /// Registry membership implies liveness; there is no health probe.
    pub fn agent_status(registry: &AgentRegistry) -> BTreeMap<String, AgentStatus> {
        registry
            .agents()
            .iter()
            .map(|agent| {
                (
                    agent.name().to_string(),
                    AgentStatus {
                        active: true,
                        last_task_success: agent.last_task_success(),
                    },
                )
            })
            .collect()
    }

    pub async fn improvement_suggestions(
        &self,
        llm: &dyn LLMClient,
        registry: &AgentRegistry,
        metrics: &PerformanceMetrics,
    ) -> Result<Vec<String>> {
        let fallback = match &self.source {
            SuggestionSource::Static(suggestions) => return Ok(suggestions.clone()),
            SuggestionSource::Model { fallback } => fallback,
        };

        let prompt = Self::build_prompt(registry, metrics);
        let response = with_deadline(self.call_timeout, "reflection", llm.generate(&prompt))
            .await
            .map_err(|e| AppError::Reflection(e.to_string()))?;

        let suggestions = parse_suggestions(&response);
        if suggestions.is_empty() {
            tracing::warn!("Gateway returned no usable suggestions, using the static list");
            return Ok(fallback.clone());
        }
        Ok(suggestions)
    }

    pub async fn reflect(
        &self,
        llm: &dyn LLMClient,
        registry: &AgentRegistry,
        performance_metrics: PerformanceMetrics,
    ) -> Result<ReflectionReport> {
        let agent_status = Self::agent_status(registry);
        let improvement_suggestions = self
            .improvement_suggestions(llm, registry, &performance_metrics)
            .await?;

        Ok(ReflectionReport {
            agent_status,
            performance_metrics,
            improvement_suggestions,
        })
    }

    fn build_prompt(registry: &AgentRegistry, metrics: &PerformanceMetrics) -> String {
        let agents = if registry.is_empty() {
            "none".to_string()
        } else {
            registry.agent_names().join(", ")
        };

        format!(
            r#"You supervise a team of research agents.

Registered agents: {}
Task success rate: {:.2}
Average response time: {:.2}s
Agent utilization: {:.2}

Suggest up to three concrete improvements to the team, one per line."#,
            agents,
            metrics.task_success_rate,
            metrics.average_response_time,
            metrics.agent_utilization
        )
    }
}

/// One suggestion per non-empty line, without list bullets or numbering.
fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim().trim_start_matches(['-', '*', '•']).trim_start();
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            match line[digits..].strip_prefix(['.', ')']) {
                Some(rest) if digits > 0 => rest.trim().to_string(),
                _ => line.trim().to_string(),
            }
        })
        .filter(|line| !line.is_empty())
        .collect()
}

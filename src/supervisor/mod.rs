//! Research supervisor
//!
//! The orchestration core: a task is decomposed into subtasks, each subtask is
//! routed to the first capable specialist agent, the results are integrated
//! into one report. Reflection is an independent read-only pass over the fleet.
//!
//! ```text
//! process(task)
//!   ── decompose ──> [subtask, subtask, ...]
//!   ── for each: route ──> agent.process ──> results[type] = result
//!   ── integrate(results) ──> {status: "success", integrated_result, sub_results}
//!
//! any failure ──> {status: "error", message}
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use supervisor::{Supervisor, SupervisorConfig, Task};
//!
//! let config = SupervisorConfig::load("supervisor.toml")?;
//! let supervisor = Supervisor::from_config(&config).await?;
//!
//! let outcome = supervisor.process(&Task::new("effects of caffeine on memory")).await;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! ```

pub mod decomposer;
pub mod integrator;
pub mod metrics;
pub mod queue;
pub mod reflection;

use crate::agents::{Agent, AgentRegistry, AgentRouter};
use crate::llm::LLMClient;
use crate::types::{
    AppError, IntegratedResult, PerformanceMetrics, ProcessOutcome, ReflectOutcome,
    ReflectionReport, Result, SubResults, Subtask, SubtaskResult, Task,
};
use crate::utils::toml_config::{SupervisorConfig, SupervisorSettings};
use decomposer::{SubtaskParser, TaskDecomposer};
use futures::future::try_join_all;
use integrator::ResultIntegrator;
use metrics::MetricsRecorder;
use reflection::ReflectionModule;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// How routed subtasks of one `process` call are dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One agent call at a time, in decomposition order
    #[default]
    Sequential,
    /// All agent calls at once; results still merge in decomposition order
    Concurrent,
}

/// Await `fut`, failing with [`AppError::Timeout`] once `limit` elapses.
pub(crate) async fn with_deadline<T, F>(limit: Option<Duration>, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            AppError::Timeout(format!("{} did not finish within {:?}", what, limit))
        })?,
        None => fut.await,
    }
}

pub struct Supervisor {
    llm: Arc<dyn LLMClient>,
    router: AgentRouter,
    decomposer: TaskDecomposer,
    integrator: ResultIntegrator,
    reflection: ReflectionModule,
    dispatch: DispatchMode,
    call_timeout: Option<Duration>,
    metrics: MetricsRecorder,
}

impl Supervisor {
    /// Supervisor with default settings: structured parsing, sequential
    /// dispatch, no timeouts, static suggestions.
    pub fn new(llm: Arc<dyn LLMClient>, registry: AgentRegistry) -> Self {
        Self::with_settings(llm, registry, &SupervisorSettings::default())
    }

    pub fn with_settings(
        llm: Arc<dyn LLMClient>,
        registry: AgentRegistry,
        settings: &SupervisorSettings,
    ) -> Self {
        let call_timeout = settings.call_timeout();

        Self {
            llm,
            router: AgentRouter::new(Arc::new(registry)),
            decomposer: TaskDecomposer::new(settings.parser).with_timeout(call_timeout),
            integrator: ResultIntegrator::new(call_timeout),
            reflection: ReflectionModule::from_settings(settings),
            dispatch: settings.dispatch,
            call_timeout,
            metrics: MetricsRecorder::new(),
        }
    }

    /// Build the gateway and the agent fleet described by a configuration file
    pub async fn from_config(config: &SupervisorConfig) -> Result<Self> {
        let provider = config.llm.provider()?;
        info!(
            "Creating {} gateway with model '{}'",
            provider.name(),
            provider.model()
        );

        let llm = provider.create_client().await?;
        let registry = AgentRegistry::from_config(&config.agents, Arc::clone(&llm));
        info!("Registered {} specialist agent(s)", registry.len());

        Ok(Self::with_settings(llm, registry, &config.supervisor))
    }

    /// Replace the decomposition parser
    pub fn with_parser(mut self, parser: Box<dyn SubtaskParser>) -> Self {
        self.decomposer = TaskDecomposer::with_parser(parser).with_timeout(self.call_timeout);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        self.router.registry()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.metrics.snapshot(self.router.registry())
    }

    /// Run a task end to end. Failures come back as `{status: "error", message}`.
    pub async fn process(&self, task: &Task) -> ProcessOutcome {
        let started = Instant::now();
        let result = self.try_process(task).await;
        self.metrics.record_task(result.is_ok(), started.elapsed());

        if let Err(e) = &result {
            error!("Processing failed: {}", e);
        }
        result.into()
    }

    /// Like [`Supervisor::process`] but with the typed error.
    pub async fn try_process(&self, task: &Task) -> Result<IntegratedResult> {
        let subtasks = self.decomposer.decompose(self.llm.as_ref(), task).await?;
        info!("Task decomposed into {} subtask(s)", subtasks.len());

        let results = match self.dispatch {
            DispatchMode::Sequential => self.dispatch_sequential(&subtasks).await?,
            DispatchMode::Concurrent => self.dispatch_concurrent(&subtasks).await?,
        };

        info!("Integrating {} result(s)", results.len());
        self.integrator.integrate(self.llm.as_ref(), results).await
    }

    async fn dispatch_sequential(&self, subtasks: &[Subtask]) -> Result<SubResults> {
        let mut results = SubResults::new();

        for subtask in subtasks {
            match self.router.select(subtask) {
                Some(agent) => {
                    let output = self.dispatch_one(&agent, subtask).await?;
                    results.insert(subtask.task_type.clone(), output);
                }
                None => info!("Skipping '{}' subtask: no capable agent", subtask.task_type),
            }
        }

        Ok(results)
    }

    async fn dispatch_concurrent(&self, subtasks: &[Subtask]) -> Result<SubResults> {
        let routed: Vec<(&Subtask, Arc<dyn Agent>)> = subtasks
            .iter()
            .filter_map(|subtask| match self.router.select(subtask) {
                Some(agent) => Some((subtask, agent)),
                None => {
                    info!("Skipping '{}' subtask: no capable agent", subtask.task_type);
                    None
                }
            })
            .collect();

        let outputs = try_join_all(
            routed
                .iter()
                .map(|(subtask, agent)| self.dispatch_one(agent, subtask)),
        )
        .await?;

        let mut results = SubResults::new();
        for ((subtask, _), output) in routed.iter().zip(outputs) {
            results.insert(subtask.task_type.clone(), output);
        }
        Ok(results)
    }

    async fn dispatch_one(
        &self,
        agent: &Arc<dyn Agent>,
        subtask: &Subtask,
    ) -> Result<SubtaskResult> {
        debug!("Dispatching '{}' subtask to '{}'", subtask.task_type, agent.name());

        let label = format!("agent '{}'", agent.name());
        let outcome = with_deadline(self.call_timeout, &label, agent.process(subtask)).await;
        self.metrics.record_dispatch(agent.name());

        outcome.map_err(|e| {
            AppError::Dispatch(format!(
                "agent '{}' failed on '{}' subtask: {}",
                agent.name(),
                subtask.task_type,
                e
            ))
        })
    }

    /// Report on fleet health. Failures come back as `{status: "error", message}`.
    pub async fn reflect(&self) -> ReflectOutcome {
        let result = self.try_reflect().await;
        if let Err(e) = &result {
            error!("Reflection failed: {}", e);
        }
        result.into()
    }

    /// Like [`Supervisor::reflect`] but with the typed error.
    pub async fn try_reflect(&self) -> Result<ReflectionReport> {
        let registry = self.router.registry();
        self.reflection
            .reflect(self.llm.as_ref(), registry, self.metrics.snapshot(registry))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_expires() {
        let err = with_deadline(Some(Duration::from_millis(10)), "slow call", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Timeout(ref msg) if msg.contains("slow call")));
    }

    #[tokio::test]
    async fn test_no_deadline_passes_through() {
        let value = with_deadline(None, "call", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_dispatch_mode_serde() {
        let mode: DispatchMode = serde_json::from_str("\"concurrent\"").unwrap();
        assert_eq!(mode, DispatchMode::Concurrent);
        assert_eq!(DispatchMode::default(), DispatchMode::Sequential);
    }
}

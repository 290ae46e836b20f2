use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============= Task Types =============

/// A research task handed to the supervisor.
///
/// Only `content` is interpreted; any other fields travel along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Attach a free-form field to the task.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A unit of work derived from a [`Task`], routed by its `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(rename = "type")]
    pub task_type: String,
    pub goal: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Subtask {
    pub fn new(task_type: impl Into<String>, goal: impl Into<String>, resources: &[&str]) -> Self {
        Self {
            task_type: task_type.into(),
            goal: goal.into(),
            resources: resources.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Whatever a specialist agent returns for a subtask.
pub type SubtaskResult = Value;

/// Results keyed by subtask type. A repeated type keeps the last result written.
pub type SubResults = BTreeMap<String, SubtaskResult>;

// ============= Outcome Types =============

/// Successful result of a `process` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename = "success")]
pub struct IntegratedResult {
    pub integrated_result: String,
    pub sub_results: SubResults,
}

/// `{status: "error", message}` returned by every public entry point on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename = "error")]
pub struct ErrorResult {
    pub message: String,
}

impl From<AppError> for ErrorResult {
    fn from(err: AppError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Outcome of `Supervisor::process`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessOutcome {
    Success(IntegratedResult),
    Error(ErrorResult),
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success(_))
    }

    pub fn success(&self) -> Option<&IntegratedResult> {
        match self {
            ProcessOutcome::Success(result) => Some(result),
            ProcessOutcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProcessOutcome::Success(_) => None,
            ProcessOutcome::Error(err) => Some(&err.message),
        }
    }
}

impl From<Result<IntegratedResult>> for ProcessOutcome {
    fn from(result: Result<IntegratedResult>) -> Self {
        match result {
            Ok(integrated) => ProcessOutcome::Success(integrated),
            Err(err) => ProcessOutcome::Error(err.into()),
        }
    }
}

// ============= Reflection Types =============

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStatus {
    pub active: bool,
    /// `None` when the agent does not track its last outcome.
    pub last_task_success: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub task_success_rate: f64,
    pub average_response_time: f64,
    pub agent_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectionReport {
    pub agent_status: BTreeMap<String, AgentStatus>,
    pub performance_metrics: PerformanceMetrics,
    pub improvement_suggestions: Vec<String>,
}

/// Outcome of `Supervisor::reflect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReflectOutcome {
    Report(ReflectionReport),
    Error(ErrorResult),
}

impl ReflectOutcome {
    pub fn report(&self) -> Option<&ReflectionReport> {
        match self {
            ReflectOutcome::Report(report) => Some(report),
            ReflectOutcome::Error(_) => None,
        }
    }
}

impl From<Result<ReflectionReport>> for ReflectOutcome {
    fn from(result: Result<ReflectionReport>) -> Self {
        match result {
            Ok(report) => ReflectOutcome::Report(report),
            Err(err) => ReflectOutcome::Error(err.into()),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Task decomposition failed: {0}")]
    Decomposition(String),

    #[error("Subtask dispatch failed: {0}")]
    Dispatch(String),

    #[error("Result integration failed: {0}")]
    Integration(String),

    #[error("Reflection failed: {0}")]
    Reflection(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

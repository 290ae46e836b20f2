//! Mock implementations for testing.
//!
//! Scripted gateway and specialist agents shared by the integration test
//! files, so each test can count exactly which calls the supervisor made.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use supervisor::types::{AppError, Result, Subtask, SubtaskResult};
use supervisor::{Agent, LLMClient};

/// Mock gateway that replays scripted replies in order.
///
/// Once the script runs out every call answers with the fallback reply.
/// Every prompt is recorded.
///
/// # Examples
///
/// ```ignore
/// let llm = MockLLMClient::scripted(vec![
///     Ok(r#"[{"type": "research", "goal": "survey"}]"#.to_string()),
///     Ok("integrated report".to_string()),
/// ]);
/// ```
pub struct MockLLMClient {
    script: Mutex<VecDeque<Result<String>>>,
    fallback: String,
    failing: bool,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl MockLLMClient {
    /// Answer every call with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: response.to_string(),
            failing: false,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Replay `replies` in order, then fall back to an empty string.
    pub fn scripted(replies: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::new("")
        }
    }

    /// Decomposition reply followed by integration reply.
    pub fn for_process(decomposition: &str, report: &str) -> Self {
        Self::scripted(vec![Ok(decomposition.to_string()), Ok(report.to_string())])
    }

    /// Every call fails with an LLM error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new("")
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Number of integration requests seen so far.
    pub fn integration_calls(&self) -> usize {
        self.prompts
            .lock()
            .iter()
            .filter(|p| p.starts_with("Integrate the results"))
            .count()
    }

    async fn answer(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.answer(prompt).await
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.answer(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Specialist agent with a fixed accepted type and canned output.
pub struct MockAgent {
    name: String,
    accepts: Vec<String>,
    output: Option<Value>,
    failing: bool,
    delay: Option<Duration>,
    goal_delays: Vec<(String, Duration)>,
    calls: AtomicUsize,
    last_success: Mutex<Option<bool>>,
}

impl MockAgent {
    pub fn new(name: &str, accepts: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            accepts: accepts.iter().map(|t| t.to_string()).collect(),
            output: None,
            failing: false,
            delay: None,
            goal_delays: Vec::new(),
            calls: AtomicUsize::new(0),
            last_success: Mutex::new(None),
        }
    }

    /// Return `output` instead of the default `{agent, type, goal}` echo.
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Extra sleep for subtasks with this goal.
    pub fn with_goal_delay(mut self, goal: &str, delay: Duration) -> Self {
        self.goal_delays.push((goal.to_string(), delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, subtask: &Subtask) -> bool {
        self.accepts.iter().any(|t| t == &subtask.task_type)
    }

    async fn process(&self, subtask: &Subtask) -> Result<SubtaskResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((_, delay)) = self.goal_delays.iter().find(|(g, _)| g == &subtask.goal) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing {
            *self.last_success.lock() = Some(false);
            return Err(AppError::LLM(format!("{} is offline", self.name)));
        }

        *self.last_success.lock() = Some(true);
        Ok(self.output.clone().unwrap_or_else(|| {
            json!({
                "agent": self.name,
                "type": subtask.task_type,
                "goal": subtask.goal,
            })
        }))
    }

    fn last_task_success(&self) -> Option<bool> {
        *self.last_success.lock()
    }
}

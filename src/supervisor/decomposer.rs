//! Task decomposition
//!
//! One gateway call per task. The response text is turned into subtasks by a
//! pluggable [`SubtaskParser`]; [`ParserMode`] picks one of the built-in
//! parsers.

use super::with_deadline;
use crate::llm::LLMClient;
use crate::types::{AppError, Result, Subtask, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Which built-in parser reads the decomposition response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    /// Parse the JSON subtask list the prompt asks for
    #[default]
    Structured,
    /// Ignore the response and always produce one literature-review subtask
    Fixed,
}

/// Turns the gateway's decomposition response into subtasks
pub trait SubtaskParser: Send + Sync {
    fn parse(&self, response: &str) -> Result<Vec<Subtask>>;
}

/// Baseline parser: one `research` subtask regardless of the response.
pub struct FixedSubtaskParser;

impl SubtaskParser for FixedSubtaskParser {
    fn parse(&self, _response: &str) -> Result<Vec<Subtask>> {
        Ok(vec![Subtask::new(
            "research",
            "literature review",
            &["papers", "databases"],
        )])
    }
}

/// Reads a JSON list of `{type, goal, resources}` objects.
///
/// Accepts a bare array, a single object or `{"subtasks": [...]}`, with or
/// without prose and code fences around it. Entries without a type are dropped.
pub struct StructuredSubtaskParser;

impl StructuredSubtaskParser {
    fn extract_json(text: &str) -> Option<Value> {
        let trimmed = text.trim();
        if let Ok(value) = serde_json::from_str(trimmed) {
            return Some(value);
        }

        let mut spans = Vec::new();
        for (open, close) in [('[', ']'), ('{', '}')] {
            if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
                if start < end {
                    spans.push((start, end));
                }
            }
        }
        spans.sort_unstable();

        spans
            .into_iter()
            .find_map(|(start, end)| serde_json::from_str(&trimmed[start..=end]).ok())
    }

    fn text_field<'a>(
        entry: &'a serde_json::Map<String, Value>,
        keys: &[&str],
    ) -> Option<&'a str> {
        keys.iter()
            .find_map(|key| entry.get(*key).and_then(Value::as_str))
            .map(str::trim)
    }

    fn subtask_from_value(value: &Value) -> Option<Subtask> {
        let entry = value.as_object()?;

        let task_type = match Self::text_field(entry, &["type", "task_type"]) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => {
                tracing::warn!("Dropping subtask without a type: {}", value);
                return None;
            }
        };
        let goal = Self::text_field(entry, &["goal", "objective"])
            .unwrap_or_default()
            .to_string();
        let resources = match entry.get("resources") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(list)) => list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Some(Subtask {
            task_type,
            goal,
            resources,
        })
    }
}

impl SubtaskParser for StructuredSubtaskParser {
    fn parse(&self, response: &str) -> Result<Vec<Subtask>> {
        let value = Self::extract_json(response).ok_or_else(|| {
            AppError::Decomposition("model response contains no JSON subtask list".to_string())
        })?;

        let entries = match value {
            Value::Array(entries) => entries,
            Value::Object(mut entry) => match entry.remove("subtasks") {
                Some(Value::Array(entries)) => entries,
                Some(other) => {
                    return Err(AppError::Decomposition(format!(
                        "'subtasks' must be a list, got {}",
                        other
                    )));
                }
                None => vec![Value::Object(entry)],
            },
            other => {
                return Err(AppError::Decomposition(format!(
                    "expected a JSON list of subtasks, got {}",
                    other
                )));
            }
        };

        Ok(entries.iter().filter_map(Self::subtask_from_value).collect())
    }
}

impl ParserMode {
    pub fn parser(self) -> Box<dyn SubtaskParser> {
        match self {
            ParserMode::Structured => Box::new(StructuredSubtaskParser),
            ParserMode::Fixed => Box::new(FixedSubtaskParser),
        }
    }
}

pub struct TaskDecomposer {
    parser: Box<dyn SubtaskParser>,
    call_timeout: Option<Duration>,
}

impl TaskDecomposer {
    pub fn new(mode: ParserMode) -> Self {
        Self::with_parser(mode.parser())
    }

    pub fn with_parser(parser: Box<dyn SubtaskParser>) -> Self {
        Self {
            parser,
            call_timeout: None,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn build_prompt(task: &Task) -> String {
        format!(
            r#"Decompose the following research task into subtasks:
{}

Each subtask must state:
1. its type
2. its concrete goal
3. the resources it requires

Respond with ONLY a JSON array, for example:
[{{"type": "research", "goal": "literature review", "resources": ["papers", "databases"]}}]"#,
            task.content
        )
    }

    /// Ask the gateway for a decomposition and parse it, in subtask order.
    pub async fn decompose(&self, llm: &dyn LLMClient, task: &Task) -> Result<Vec<Subtask>> {
        let prompt = Self::build_prompt(task);

        let response = with_deadline(self.call_timeout, "decomposition", llm.generate(&prompt))
            .await
            .map_err(|e| AppError::Decomposition(e.to_string()))?;

        self.parser.parse(&response).map_err(|e| match e {
            AppError::Decomposition(_) => e,
            other => AppError::Decomposition(other.to_string()),
        })
    }
}

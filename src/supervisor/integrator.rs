use super::with_deadline;
use crate::llm::LLMClient;
use crate::types::{AppError, IntegratedResult, Result, SubResults};
use std::time::Duration;

/// Merges subtask results into one report with a single gateway call.
#[derive(Debug, Clone, Default)]
pub struct ResultIntegrator {
    call_timeout: Option<Duration>,
}

impl ResultIntegrator {
    pub fn new(call_timeout: Option<Duration>) -> Self {
        Self { call_timeout }
    }

    pub fn build_prompt(results: &SubResults) -> Result<String> {
        let rendered = serde_json::to_string_pretty(results)
            .map_err(|e| AppError::Integration(format!("Failed to render results: {}", e)))?;

        Ok(format!(
            r#"Integrate the results of the following research subtasks:
{}

Provide:
1. Overall conclusions
2. Key findings
3. Suggested follow-up work"#,
            rendered
        ))
    }

    /// Runs even when `results` is empty.
    pub async fn integrate(
        &self,
        llm: &dyn LLMClient,
        results: SubResults,
    ) -> Result<IntegratedResult> {
        let prompt = Self::build_prompt(&results)?;

        let report = with_deadline(self.call_timeout, "integration", llm.generate(&prompt))
            .await
            .map_err(|e| AppError::Integration(e.to_string()))?;

        Ok(IntegratedResult {
            integrated_result: report,
            sub_results: results,
        })
    }
}

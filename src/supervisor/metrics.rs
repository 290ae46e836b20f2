use crate::agents::AgentRegistry;
use crate::types::PerformanceMetrics;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Default)]
struct Counters {
    tasks_total: u64,
    tasks_succeeded: u64,
    total_response_time: Duration,
    agents_used: HashSet<String>,
}

/// Running totals behind [`PerformanceMetrics`], shared by concurrent `process` calls.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    counters: Mutex<Counters>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_task(&self, success: bool, elapsed: Duration) {
        let mut counters = self.counters.lock();
        counters.tasks_total += 1;
        if success {
            counters.tasks_succeeded += 1;
        }
        counters.total_response_time += elapsed;
    }

    pub fn record_dispatch(&self, agent_name: &str) {
        self.counters.lock().agents_used.insert(agent_name.to_string());
    }

    pub fn snapshot(&self, registry: &AgentRegistry) -> PerformanceMetrics {
        let counters = self.counters.lock();

        let (task_success_rate, average_response_time) = if counters.tasks_total == 0 {
            (0.0, 0.0)
        } else {
            let total = counters.tasks_total as f64;
            (
                counters.tasks_succeeded as f64 / total,
                counters.total_response_time.as_secs_f64() / total,
            )
        };

        let agent_utilization = if registry.is_empty() {
            0.0
        } else {
            let used = registry
                .agents()
                .iter()
                .filter(|agent| counters.agents_used.contains(agent.name()))
                .count();
            used as f64 / registry.len() as f64
        };

        PerformanceMetrics {
            task_success_rate,
            average_response_time,
            agent_utilization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::types::{Result, Subtask, SubtaskResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Named(&'static str);

    #[async_trait]
    impl Agent for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn can_handle(&self, _: &Subtask) -> bool {
            false
        }
        async fn process(&self, _: &Subtask) -> Result<SubtaskResult> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn test_fresh_recorder_reports_zeros() {
        let metrics = MetricsRecorder::new().snapshot(&AgentRegistry::empty());
        assert_eq!(metrics, PerformanceMetrics::default());
    }

    #[test]
    fn test_rates_and_utilization() {
        let registry = AgentRegistry::builder()
            .register(Arc::new(Named("generator")))
            .register(Arc::new(Named("ranker")))
            .build();
        let recorder = MetricsRecorder::new();

        recorder.record_task(true, Duration::from_secs(2));
        recorder.record_task(false, Duration::from_secs(4));
        recorder.record_task(true, Duration::from_secs(3));
        recorder.record_dispatch("generator");
        recorder.record_dispatch("generator");

        let metrics = recorder.snapshot(&registry);
        assert!((metrics.task_success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((metrics.average_response_time - 3.0).abs() < 1e-9);
        assert!((metrics.agent_utilization - 0.5).abs() < 1e-9);
    }
}

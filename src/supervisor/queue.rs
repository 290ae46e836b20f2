//! Background task queue
//!
//! Tasks are processed one at a time, in submission order, by a worker
//! spawned on the tokio runtime. Callers poll [`TaskQueue::status`] or await
//! [`TaskQueue::wait`]. The worker stops once every handle is dropped.

use super::Supervisor;
use crate::types::{AppError, ProcessOutcome, Result, Task};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tracing::{info, warn};
use uuid::Uuid;

/// Where a submitted task currently is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Queued {
        /// 1-based position among waiting tasks
        position: usize,
        created_at: DateTime<Utc>,
    },
    Processing {
        started_at: DateTime<Utc>,
    },
    Completed {
        result: ProcessOutcome,
        completed_at: DateTime<Utc>,
    },
    Failed {
        result: ProcessOutcome,
        completed_at: DateTime<Utc>,
    },
    Cancelled,
    NotFound,
}

impl TaskStatus {
    /// No further transitions will happen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed { .. }
                | TaskStatus::Failed { .. }
                | TaskStatus::Cancelled
                | TaskStatus::NotFound
        )
    }
}

struct QueuedTask {
    id: String,
    task: Task,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueuedTask>,
    current: Option<(String, DateTime<Utc>)>,
    finished: HashMap<String, TaskStatus>,
}

impl QueueState {
    fn knows(&self, id: &str) -> bool {
        self.finished.contains_key(id)
            || self.pending.iter().any(|t| t.id == id)
            || self.current.as_ref().is_some_and(|(current, _)| current == id)
    }
}

/// Handle to the background queue; cheap to clone.
#[derive(Clone)]
pub struct TaskQueue {
    state: Arc<Mutex<QueueState>>,
    settled: Arc<Notify>,
    sender: mpsc::UnboundedSender<()>,
}

impl TaskQueue {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(supervisor: Arc<Supervisor>) -> Self {
        let state = Arc::new(Mutex::new(QueueState::default()));
        let settled = Arc::new(Notify::new());
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(
            supervisor,
            Arc::clone(&state),
            Arc::clone(&settled),
            receiver,
        ));

        Self {
            state,
            settled,
            sender,
        }
    }

    /// Queue a task under a fresh id
    pub fn submit(&self, task: Task) -> Result<String> {
        self.submit_with_id(Uuid::new_v4().to_string(), task)
    }

    /// Queue a task under a caller-chosen id
    pub fn submit_with_id(&self, id: impl Into<String>, task: Task) -> Result<String> {
        let id = id.into();
        {
            let mut state = self.state.lock();
            if state.knows(&id) {
                return Err(AppError::InvalidInput(format!(
                    "task id '{}' is already in use",
                    id
                )));
            }
            state.pending.push_back(QueuedTask {
                id: id.clone(),
                task,
                created_at: Utc::now(),
            });
        }

        self.sender
            .send(())
            .map_err(|_| AppError::Internal("task queue worker has stopped".to_string()))?;
        info!("Task queued: {}", id);
        Ok(id)
    }

    pub fn status(&self, id: &str) -> TaskStatus {
        let state = self.state.lock();

        if let Some((current, started_at)) = &state.current {
            if current == id {
                return TaskStatus::Processing {
                    started_at: *started_at,
                };
            }
        }

        if let Some(index) = state.pending.iter().position(|t| t.id == id) {
            return TaskStatus::Queued {
                position: index + 1,
                created_at: state.pending[index].created_at,
            };
        }

        state
            .finished
            .get(id)
            .cloned()
            .unwrap_or(TaskStatus::NotFound)
    }

    /// Drop every task still waiting and mark it cancelled.
    ///
    /// The task being processed is not interrupted: it runs to completion and
    /// records its own result.
    pub fn cancel_pending(&self) -> usize {
        let cancelled = {
            let mut state = self.state.lock();
            let drained: Vec<QueuedTask> = state.pending.drain(..).collect();
            for task in &drained {
                state.finished.insert(task.id.clone(), TaskStatus::Cancelled);
            }
            drained.len()
        };

        if cancelled > 0 {
            warn!("Cancelled {} queued task(s)", cancelled);
            self.settled.notify_waiters();
        }
        cancelled
    }

    /// Evict the record of a finished task, returning whether one existed.
    ///
    /// Waiting and running tasks are left alone. A forgotten id reports
    /// [`TaskStatus::NotFound`] and may be submitted again.
    pub fn forget(&self, id: &str) -> bool {
        self.state.lock().finished.remove(id).is_some()
    }

    /// Resolve once the task is completed, failed, cancelled or unknown.
    pub async fn wait(&self, id: &str) -> TaskStatus {
        loop {
            let notified = self.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let status = self.status(id);
            if status.is_terminal() {
                return status;
            }
            notified.await;
        }
    }
}

async fn run_worker(
    supervisor: Arc<Supervisor>,
    state: Arc<Mutex<QueueState>>,
    settled: Arc<Notify>,
    mut receiver: mpsc::UnboundedReceiver<()>,
) {
    // One signal per submission; cancelled tasks leave signals with nothing to pop.
    while receiver.recv().await.is_some() {
        let next = {
            let mut state = state.lock();
            let next = state.pending.pop_front();
            if let Some(task) = &next {
                state.current = Some((task.id.clone(), Utc::now()));
            }
            next
        };

        let Some(QueuedTask { id, task, .. }) = next else {
            continue;
        };

        info!("Processing queued task: {}", id);
        let result = supervisor.process(&task).await;
        let completed_at = Utc::now();
        let status = if result.is_success() {
            TaskStatus::Completed {
                result,
                completed_at,
            }
        } else {
            TaskStatus::Failed {
                result,
                completed_at,
            }
        };

        {
            let mut state = state.lock();
            state.current = None;
            state.finished.insert(id.clone(), status);
        }
        info!("Queued task finished: {}", id);
        settled.notify_waiters();
    }
}

//! # ARES Supervisor - multi-agent research orchestration
//!
//! The supervisor at the heart of a multi-agent research assistant. It takes a
//! research task, asks a language model to break it into typed subtasks,
//! hands each subtask to the first specialist agent that accepts its type,
//! and asks the language model again to integrate the results into a single
//! report. A separate reflection pass reports on the health and performance
//! of the agent fleet.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use supervisor::{AgentRegistry, Provider, Supervisor, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let llm = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.2".to_string(),
//!     }
//!     .create_client()
//!     .await?;
//!
//!     let supervisor = Supervisor::new(llm, AgentRegistry::empty());
//!     let outcome = supervisor.process(&Task::new("effects of caffeine on memory")).await;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use supervisor::{Supervisor, SupervisorConfig};
//! use supervisor::utils::telemetry::init_tracing;
//!
//! let config = SupervisorConfig::load("supervisor.toml")?;
//! init_tracing(&config.logging)?;
//! let supervisor = Supervisor::from_config(&config).await?;
//! let report = supervisor.reflect().await;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI and compatible endpoints such as DeepSeek and DashScope (default) |
//!
//! ## Modules
//!
//! - [`agents`] - Specialist agent trait, registry and router
//! - [`llm`] - Language-model gateway clients
//! - [`supervisor`] - Decomposition, dispatch, integration, reflection, task queue
//! - [`types`] - Tasks, subtasks, outcomes and errors
//! - [`utils`] - Configuration and tracing setup

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Specialist agents and capability routing.
pub mod agents;
/// LLM provider clients and abstractions.
pub mod llm;
/// Orchestration core.
pub mod supervisor;
/// Core types (tasks, outcomes, errors).
pub mod types;
/// Configuration and tracing utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{Agent, AgentKind, AgentRegistry, AgentRegistryBuilder, AgentRouter};
pub use llm::{LLMClient, Provider};
pub use supervisor::decomposer::{ParserMode, SubtaskParser};
pub use supervisor::queue::{TaskQueue, TaskStatus};
pub use supervisor::{DispatchMode, Supervisor};
pub use types::{
    AppError, IntegratedResult, ProcessOutcome, ReflectOutcome, ReflectionReport, Result,
    Subtask, SubtaskResult, Task,
};
pub use utils::toml_config::{SupervisorConfig, SupervisorSettings};

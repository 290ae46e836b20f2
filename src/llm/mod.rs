//! Language-model gateway
//!
//! The supervisor only ever sees the [`LLMClient`] trait. Concrete clients are
//! created from a [`Provider`], usually resolved from the `[llm]` section of
//! the configuration file.
//!
//! # Supported Providers
//!
//! - `openai` - any chat-completions compatible endpoint (OpenAI, DeepSeek, Qwen),
//!   cargo feature `openai`
//! - `ollama` - local Ollama server (cargo feature `ollama`)
//!
//! # Example
//!
//! ```ignore
//! use supervisor::llm::Provider;
//!
//! let provider = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! };
//! let client = provider.create_client().await?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Chat-completions client over async-openai.
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

pub use client::{LLMClient, Provider};

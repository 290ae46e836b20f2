//! LLM Client abstractions and provider management
//!
//! This module provides the gateway the supervisor talks to:
//! - **OpenAI-compatible**: OpenAI, DeepSeek, Qwen (DashScope) and any other
//!   endpoint speaking the chat-completions protocol (cargo feature `openai`)
//! - **Ollama**: local inference (cargo feature `ollama`)

use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Generic LLM client trait for provider abstraction
///
/// All gateway implementations provide this trait, so the supervisor and the
/// specialist agents never depend on a concrete provider.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone, PartialEq)]
pub enum Provider {
    /// Any chat-completions compatible API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.deepseek.com/v1".to_string(),
    ///     model: "deepseek-chat".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not compiled in or its settings are invalid.
    pub async fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Arc::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )?)),

            #[cfg(not(feature = "openai"))]
            Provider::OpenAI { model, .. } => Err(crate::types::AppError::Configuration(format!(
                "OpenAI provider requested for model '{}' but the `openai` feature is disabled",
                model
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url, model.clone())?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(crate::types::AppError::Configuration(format!(
                "Ollama provider requested for model '{}' but the `ollama` feature is disabled",
                model
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

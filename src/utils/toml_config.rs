//! TOML-based configuration for the supervisor
//!
//! One file (`supervisor.toml` by convention) declares the language-model
//! provider, the supervisor's behavior switches, logging and the ordered list
//! of specialist agents. API keys never live in the file: each remote provider
//! names the environment variable holding its key, and `.env` is loaded first.
//!
//! ```toml
//! [llm]
//! type = "qwen"
//!
//! [supervisor]
//! parser = "structured"
//! dispatch = "sequential"
//! call_timeout_secs = 120
//!
//! [[agents]]
//! name = "generator"
//! handles = ["research", "generate_hypothesis"]
//! ```

use crate::agents::AgentKind;
use crate::llm::Provider;
use crate::supervisor::decomposer::ParserMode;
use crate::supervisor::reflection::default_suggestions;
use crate::supervisor::DispatchMode;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub llm: LlmConfig,

    #[serde(default)]
    pub supervisor: SupervisorSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Specialist agents in registration order
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

// ============= LLM Configuration =============

/// Gateway provider. The OpenAI-compatible presets only differ in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmConfig {
    OpenAI {
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    DeepSeek {
        #[serde(default = "default_deepseek_key_env")]
        api_key_env: String,
        #[serde(default = "default_deepseek_base")]
        api_base: String,
        #[serde(default = "default_deepseek_model")]
        model: String,
    },
    Qwen {
        #[serde(default = "default_qwen_key_env")]
        api_key_env: String,
        #[serde(default = "default_qwen_base")]
        api_base: String,
        #[serde(default = "default_qwen_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_deepseek_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_deepseek_base() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_qwen_key_env() -> String {
    "DASHSCOPE_API_KEY".to_string()
}

fn default_qwen_base() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_qwen_model() -> String {
    "qwen-plus".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

impl LlmConfig {
    /// Resolve into a [`Provider`], reading the API key from the environment.
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        match self {
            LlmConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            }
            | LlmConfig::DeepSeek {
                api_key_env,
                api_base,
                model,
            }
            | LlmConfig::Qwen {
                api_key_env,
                api_base,
                model,
            } => Ok(Provider::OpenAI {
                api_key: read_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
            }),
            LlmConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }
}

fn read_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name.to_string())),
    }
}

// ============= Supervisor Settings =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSettings {
    #[serde(default)]
    pub parser: ParserMode,

    #[serde(default)]
    pub dispatch: DispatchMode,

    /// Upper bound for every gateway or agent call; unset means wait forever
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,

    /// Ask the gateway for improvement suggestions during reflection
    #[serde(default)]
    pub dynamic_suggestions: bool,

    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,
}

impl SupervisorSettings {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            parser: ParserMode::default(),
            dispatch: DispatchMode::default(),
            call_timeout_secs: None,
            dynamic_suggestions: false,
            suggestions: default_suggestions(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    /// Role; inferred from `name` when omitted
    #[serde(default)]
    pub kind: Option<AgentKind>,

    /// Subtask types this agent accepts; the role's default type when empty
    #[serde(default)]
    pub handles: Vec<String>,

    #[serde(default)]
    pub system_prompt: Option<String>,
}

// ============= Errors =============

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{0}' is not set")]
    MissingEnv(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl SupervisorConfig {
    /// Load configuration from a TOML file, after merging `.env` into the environment
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::dotenv().ok();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SupervisorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supervisor.call_timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "call_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "agent name must not be empty".to_string(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "agent '{}' is declared more than once",
                    agent.name
                )));
            }
        }

        Ok(())
    }
}

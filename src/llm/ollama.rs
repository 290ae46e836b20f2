use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
};

const DEFAULT_OLLAMA_PORT: u16 = 11434;

pub struct OllamaClient {
    client: Ollama,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: String) -> Result<Self> {
        let (host, port) = split_base_url(base_url)?;
        let client = Ollama::new(host, port);

        Ok(Self { client, model })
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatMessageRequest::new(self.model.clone(), messages);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }
}

/// Split `http://host:port` into the `(scheme://host, port)` pair ollama-rs expects.
fn split_base_url(base_url: &str) -> Result<(String, u16)> {
    let (scheme, rest) = match base_url.trim().split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", base_url.trim()),
    };
    let authority = rest.trim_end_matches('/');
    if authority.is_empty() {
        return Err(AppError::Configuration(format!(
            "Invalid Ollama base_url '{}'",
            base_url
        )));
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().map_err(|_| {
                AppError::Configuration(format!("Invalid port in Ollama base_url '{}'", base_url))
            })?;
            Ok((format!("{}://{}", scheme, host), port))
        }
        None => Ok((format!("{}://{}", scheme, authority), DEFAULT_OLLAMA_PORT)),
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt.to_string())]).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::system(system.to_string()),
            ChatMessage::user(prompt.to_string()),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

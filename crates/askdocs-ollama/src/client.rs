//! Ollama client implementation

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use askdocs_core::{ChatBackend, ChatMessage, EmbeddingProvider, Error, Result};

use crate::config::OllamaConfig;

/// Ollama HTTP client implementing both the embedding and chat contracts.
///
/// Holds only transport configuration and a connection pool, so a single
/// instance is safe to share across concurrent callers.
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env())
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.config.embed_model,
            input: text,
        };

        let response = self
            .client
            .post(self.config.embed_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "embedding request failed with status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed embedding response: {e}")))?;

        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // One request per text, matching the service contract.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_single(text).await?);
        }
        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<serde_json::Value> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            stream: false,
        };
        debug!(
            "chat request to {} with {} messages",
            self.config.chat_url(),
            messages.len()
        );

        let send = async {
            let response = self
                .client
                .post(self.config.chat_url())
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::Backend(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(Error::Backend(format!(
                    "Ollama API error: status {}: {}",
                    status, body
                )));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| Error::Backend(format!("chat backend returned non-JSON response: {e}")))
        };

        match timeout(self.config.timeout(), send).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "chat request exceeded {}s",
                self.config.timeout_s
            ))),
        }
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        assert!(OllamaClient::new(OllamaConfig::default()).is_ok());
    }

    #[test]
    fn chat_request_wire_shape() {
        let messages = vec![ChatMessage::system("be helpful"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "llama3.1:8b",
            messages: &messages,
            stream: false,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama3.1:8b");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
    }

    #[test]
    fn embedding_request_wire_shape() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            input: "a chunk of text",
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "nomic-embed-text");
        assert_eq!(value["input"], "a chunk of text");
    }
}

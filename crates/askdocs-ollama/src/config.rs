//! Ollama configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Configuration for the Ollama client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub chat_path: String,
    pub embed_path: String,
    pub chat_model: String,
    pub embed_model: String,
    pub timeout_s: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            chat_path: "/api/chat".to_string(),
            embed_path: "/api/embeddings".to_string(),
            chat_model: "llama3.1:8b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            timeout_s: 60,
        }
    }
}

impl OllamaConfig {
    /// Create configuration from environment variables, falling back to the
    /// local Ollama defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let timeout_s = env::var("OLLAMA_TIMEOUT_S")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_s);

        Self {
            base_url: env::var("OLLAMA_URL").unwrap_or(defaults.base_url),
            chat_path: env::var("OLLAMA_CHAT_PATH").unwrap_or(defaults.chat_path),
            embed_path: env::var("OLLAMA_EMBED_PATH").unwrap_or(defaults.embed_path),
            chat_model: env::var("OLLAMA_CHAT_MODEL").unwrap_or(defaults.chat_model),
            embed_model: env::var("OLLAMA_EMBED_MODEL").unwrap_or(defaults.embed_model),
            timeout_s,
        }
    }

    /// Full URL of the chat endpoint
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    /// Full URL of the embeddings endpoint
    pub fn embed_url(&self) -> String {
        format!("{}{}", self.base_url, self.embed_path)
    }

    /// Per-call deadline for backend requests
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_ollama() {
        let config = OllamaConfig::default();
        assert_eq!(config.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(config.embed_url(), "http://localhost:11434/api/embeddings");
        assert_eq!(config.chat_model, "llama3.1:8b");
        assert_eq!(config.embed_model, "nomic-embed-text");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }
}

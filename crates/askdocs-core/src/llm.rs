//! Chat backend trait and message types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One turn of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Trait for chat-completion backends (e.g., Ollama)
///
/// The backend is an opaque service: `chat` returns the raw JSON response
/// body, because deployed backends disagree on its shape. Normalizing that
/// shape into an answer string is the query pipeline's job, not the
/// transport's. Transport and HTTP-level failures surface as
/// `Error::Backend`; an exceeded deadline surfaces as `Error::Timeout`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a non-streaming chat request and return the raw response body
    async fn chat(&self, messages: &[ChatMessage]) -> Result<serde_json::Value>;

    /// Get the chat model identifier being used
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<B> {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<serde_json::Value> {
        (**self).chat(messages).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_constructors_set_roles() {
        let system = ChatMessage::system("be helpful");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, "be helpful");

        let user = ChatMessage::user("hello");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn chat_message_serializes_role_and_content() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "hi");
    }
}

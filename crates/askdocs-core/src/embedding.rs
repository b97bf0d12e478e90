//! Embedding provider trait

use async_trait::async_trait;

use crate::{Error, Result};

/// Trait for embedding providers (e.g., Ollama, OpenAI, etc.)
///
/// Implementations convert text into fixed-dimensional vectors. The output is
/// order-preserving: one vector per input string, all sharing the same
/// dimension. A failed or missing vector must surface as `Error::Embedding`
/// so it can never be inserted into an index.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per text in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("provider returned no vector".to_string()))
    }

    /// Get the embedding model identifier being used
    fn model_id(&self) -> &str;
}

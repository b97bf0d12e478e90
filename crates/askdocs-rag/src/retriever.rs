//! Question-time retrieval against the shared index

use std::sync::{Arc, RwLock};

use askdocs_core::{EmbeddingProvider, Error, Result, RetrievedChunk};
use askdocs_index::FlatIndex;

/// Embeds a question, queries the shared index and labels the hits for
/// prompt assembly.
///
/// Failures stay typed (`Embedding` for the provider, `Retrieval` for the
/// index side); the query pipeline decides whether to degrade.
pub struct Retriever<E: EmbeddingProvider> {
    embedder: Arc<E>,
    index: Arc<RwLock<FlatIndex>>,
}

impl<E: EmbeddingProvider> Retriever<E> {
    pub fn new(embedder: Arc<E>, index: Arc<RwLock<FlatIndex>>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the `k` chunks most relevant to `question`, best first
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embedder.embed_one(question).await?;
        let index = self
            .index
            .read()
            .map_err(|e| Error::Retrieval(format!("index lock poisoned: {e}")))?;
        let hits = index
            .query(&vector, k)
            .map_err(|e| Error::Retrieval(e.to_string()))?;
        Ok(hits
            .into_iter()
            .map(|(score, meta)| RetrievedChunk {
                score,
                source: meta.source,
                text: meta.text,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdocs_core::ChunkMeta;
    use async_trait::async_trait;

    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("alpha") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }

        fn model_id(&self) -> &str {
            "axis-embedder"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Embedding("embedder offline".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing-embedder"
        }
    }

    fn two_entry_index() -> Arc<RwLock<FlatIndex>> {
        let mut index = FlatIndex::new(2).unwrap();
        index
            .add(
                vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                vec![
                    ChunkMeta {
                        source: "alpha.txt".to_string(),
                        chunk_id: 0,
                        text: "all about alpha".to_string(),
                    },
                    ChunkMeta {
                        source: "beta.txt".to_string(),
                        chunk_id: 0,
                        text: "all about beta".to_string(),
                    },
                ],
            )
            .unwrap();
        Arc::new(RwLock::new(index))
    }

    #[tokio::test]
    async fn retrieves_labeled_hits_best_first() {
        let retriever = Retriever::new(Arc::new(AxisEmbedder), two_entry_index());
        let hits = retriever.retrieve("tell me about alpha", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, "alpha.txt");
        assert_eq!(hits[0].text, "all about alpha");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn embedding_failure_stays_typed() {
        let retriever = Retriever::new(Arc::new(FailingEmbedder), two_entry_index());
        assert!(matches!(
            retriever.retrieve("anything", 2).await,
            Err(Error::Embedding(_))
        ));
    }
}

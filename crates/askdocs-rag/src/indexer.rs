//! Ingestion: documents to indexed chunks

use log::info;

use askdocs_core::{ChunkMeta, EmbeddingProvider, Error, Result};
use askdocs_index::FlatIndex;

use crate::chunker::split_text;
use crate::loader::Document;

/// Configuration for document ingestion
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Stored excerpts are capped at this many characters; the embedding is
    /// always computed from the full window.
    pub max_stored_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 200,
            max_stored_chars: 2000,
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Chunk, embed and index a set of documents, returning a freshly built
/// index.
///
/// The index dimension is taken from the first embedding vector. A document
/// set that produces no chunks at all is rejected rather than yielding an
/// unusable empty index.
pub async fn build_index<E: EmbeddingProvider>(
    embedder: &E,
    documents: &[Document],
    config: &IngestConfig,
) -> Result<FlatIndex> {
    let mut chunks = Vec::new();
    let mut metas = Vec::new();
    for document in documents {
        for (chunk_id, chunk) in split_text(&document.text, config.chunk_size, config.chunk_overlap)?
            .into_iter()
            .enumerate()
        {
            metas.push(ChunkMeta {
                source: document.name.clone(),
                chunk_id,
                text: truncate_chars(&chunk, config.max_stored_chars),
            });
            chunks.push(chunk);
        }
    }

    if chunks.is_empty() {
        return Err(Error::InvalidInput(
            "documents produced no chunks to index".to_string(),
        ));
    }

    info!("embedding {} chunks", chunks.len());
    let vectors = embedder.embed(&chunks).await?;
    let dim = vectors
        .first()
        .map(|v| v.len())
        .ok_or_else(|| Error::Embedding("provider returned no vectors".to_string()))?;

    let mut index = FlatIndex::new(dim)?;
    index.add(vectors, metas)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Deterministic embedder that records what it was asked to embed.
    struct CountingEmbedder {
        inputs: Mutex<Vec<String>>,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self {
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.inputs.lock().unwrap().extend(texts.iter().cloned());
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0, 0.5])
                .collect())
        }

        fn model_id(&self) -> &str {
            "counting-embedder"
        }
    }

    fn doc(name: &str, words: usize) -> Document {
        Document {
            name: name.to_string(),
            text: (0..words)
                .map(|i| format!("word{}", i))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    #[tokio::test]
    async fn builds_index_with_per_document_ordinals() {
        let embedder = CountingEmbedder::new();
        let documents = vec![doc("a.txt", 10), doc("b.txt", 6)];
        let config = IngestConfig {
            chunk_size: 4,
            chunk_overlap: 2,
            max_stored_chars: 2000,
        };

        let index = build_index(&embedder, &documents, &config).await.unwrap();
        // a.txt: ceil((10 - 2) / 2) = 4 windows; b.txt: ceil((6 - 2) / 2) = 2.
        assert_eq!(index.len(), 6);
        assert_eq!(index.dim(), 3);

        let hits = index.query(&[1.0, 1.0, 1.0], 6).unwrap();
        let b_ids: Vec<usize> = hits
            .iter()
            .filter(|(_, m)| m.source == "b.txt")
            .map(|(_, m)| m.chunk_id)
            .collect();
        assert_eq!(b_ids.len(), 2);
        assert!(b_ids.contains(&0));
        assert!(b_ids.contains(&1));
    }

    #[tokio::test]
    async fn stored_text_is_truncated_but_full_window_is_embedded() {
        let embedder = CountingEmbedder::new();
        let documents = vec![doc("long.txt", 8)];
        let config = IngestConfig {
            chunk_size: 8,
            chunk_overlap: 0,
            max_stored_chars: 10,
        };

        let index = build_index(&embedder, &documents, &config).await.unwrap();
        let hits = index.query(&[1.0, 0.1, 0.1], 1).unwrap();
        assert_eq!(hits[0].1.text.chars().count(), 10);

        let inputs = embedder.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert!(inputs[0].chars().count() > 10);
    }

    #[tokio::test]
    async fn empty_document_set_is_rejected() {
        let embedder = CountingEmbedder::new();
        let result = build_index(&embedder, &[], &IngestConfig::default()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}

//! Shared data types for the retrieval pipeline

use serde::{Deserialize, Serialize};

/// Metadata stored alongside one index row.
///
/// `chunk_id` is the chunk's ordinal within its source document; `text` is the
/// stored excerpt, which may be shorter than the window that was embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub source: String,
    pub chunk_id: usize,
    pub text: String,
}

/// One retrieval hit, formatted for prompt assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub score: f32,
    pub source: String,
    pub text: String,
}

/// Whether an answer was grounded by retrieved context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pathway {
    #[serde(rename = "RAG")]
    Rag,
    #[serde(rename = "none")]
    None,
}

impl std::fmt::Display for Pathway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pathway::Rag => write!(f, "RAG"),
            Pathway::None => write!(f, "none"),
        }
    }
}

/// Final outcome of an answered query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub pathway: Pathway,
    pub latency_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathway_serializes_to_wire_names() {
        assert_eq!(serde_json::to_string(&Pathway::Rag).unwrap(), "\"RAG\"");
        assert_eq!(serde_json::to_string(&Pathway::None).unwrap(), "\"none\"");
    }

    #[test]
    fn pathway_display_matches_wire_names() {
        assert_eq!(Pathway::Rag.to_string(), "RAG");
        assert_eq!(Pathway::None.to_string(), "none");
    }
}

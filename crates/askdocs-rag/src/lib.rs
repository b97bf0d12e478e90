//! Retrieval-augmented generation engine for askdocs
//!
//! This crate turns raw documents into an indexed corpus (chunker, loader,
//! indexer) and raw questions into grounded answers (retriever, pipeline).

mod chunker;
mod indexer;
mod loader;
mod pipeline;
mod retriever;

pub use chunker::split_text;
pub use indexer::{IngestConfig, build_index};
pub use loader::{Document, load_documents};
pub use pipeline::{PipelineConfig, QueryPipeline};
pub use retriever::Retriever;

// Re-export core types for convenience
pub use askdocs_core::{
    ChatBackend, ChatMessage, ChunkMeta, EmbeddingProvider, Error, Pathway, QueryResponse,
    Result, RetrievedChunk,
};
pub use askdocs_index::FlatIndex;

//! Core traits and types for askdocs
//!
//! This crate defines the fundamental traits and types used across the askdocs
//! system. It provides capability-facing interfaces for embedding providers and
//! chat backends, making the retrieval pipeline test-friendly and extensible.

pub mod embedding;
pub mod error;
pub mod llm;
pub mod types;

pub use embedding::EmbeddingProvider;
pub use error::{Error, Result};
pub use llm::{ChatBackend, ChatMessage};
pub use types::{ChunkMeta, Pathway, QueryResponse, RetrievedChunk};

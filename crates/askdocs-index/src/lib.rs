//! Flat cosine-similarity vector index for askdocs
//!
//! This crate provides the durable, queryable store mapping vectors to chunk
//! metadata. Similarity is exact: every stored row is compared on every query.
//! That is deliberate at the scale askdocs targets; a future approximate index
//! would slot in behind the same add/query/save/load surface.

mod flat;

pub use flat::FlatIndex;

// Re-export core types for convenience
pub use askdocs_core::{ChunkMeta, Error, Result};

//! Ollama integration for askdocs
//!
//! This crate provides the Ollama implementations of the `EmbeddingProvider`
//! and `ChatBackend` traits.

mod client;
mod config;

pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use askdocs_core::{ChatBackend, ChatMessage, EmbeddingProvider, Error, Result};

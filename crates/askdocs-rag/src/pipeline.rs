//! Query orchestration: validate, guard, retrieve, compose, generate, emit

use std::env;
use std::time::Instant;

use log::warn;
use serde_json::Value;

use askdocs_core::{
    ChatBackend, ChatMessage, EmbeddingProvider, Error, Pathway, QueryResponse, Result,
    RetrievedChunk,
};

use crate::retriever::Retriever;

/// Marker phrases that reject a question before it reaches the backend
const INJECTION_MARKERS: [&str; 6] = [
    "ignore previous",
    "disregard previous",
    "forget instructions",
    "override the",
    "jailbreak",
    "system:",
];

/// Upper bound on the serialize-and-truncate fallback answer
const RAW_ANSWER_LIMIT: usize = 2000;

const DEFAULT_SYSTEM_PROMPT: &str = "You answer user questions using the retrieved document \
     excerpts. Cite sources like [file.pdf]. Do not hallucinate. If unclear, ask a short \
     clarifying question.";

/// Configuration for the query pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_input_len: usize,
    pub top_k: usize,
    pub system_prompt: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_input_len: 2000,
            top_k: 4,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_input_len: env::var("MAX_INPUT_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_input_len),
            top_k: env::var("TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_k),
            system_prompt: env::var("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
        }
    }
}

/// Per-request pipeline turning a raw question into a grounded answer.
///
/// The retriever is an optional dependency injected once at startup; when it
/// is absent, or when retrieval fails mid-request, the request proceeds with
/// no context and the `none` pathway instead of failing.
pub struct QueryPipeline<E: EmbeddingProvider, B: ChatBackend> {
    backend: B,
    retriever: Option<Retriever<E>>,
    config: PipelineConfig,
}

impl<E: EmbeddingProvider, B: ChatBackend> QueryPipeline<E, B> {
    /// Create a pipeline with no retrieval (every answer takes the `none`
    /// pathway)
    pub fn new(backend: B, config: PipelineConfig) -> Self {
        Self {
            backend,
            retriever: None,
            config,
        }
    }

    /// Create a pipeline with retrieval support
    pub fn with_retriever(backend: B, retriever: Retriever<E>, config: PipelineConfig) -> Self {
        Self {
            backend,
            retriever: Some(retriever),
            config,
        }
    }

    /// Whether an index is loaded behind this pipeline
    pub fn index_loaded(&self) -> bool {
        self.retriever.is_some()
    }

    /// Answer a question.
    ///
    /// `Error::Validation` means the request was rejected before any
    /// external call; `Error::Backend` / `Error::Timeout` mean the chat
    /// backend failed. Retrieval problems never fail the request.
    pub async fn answer(&self, question: &str) -> Result<QueryResponse> {
        let started = Instant::now();
        let question = question.trim();

        if question.is_empty() {
            return Err(Error::Validation("Question is empty".to_string()));
        }
        if question.chars().count() > self.config.max_input_len {
            return Err(Error::Validation(format!(
                "Input too long (> {} chars)",
                self.config.max_input_len
            )));
        }
        if contains_injection(question) {
            return Err(Error::Validation(
                "Prompt-injection detected, refusing to run the query".to_string(),
            ));
        }

        let (pathway, context) = match &self.retriever {
            Some(retriever) => match retriever.retrieve(question, self.config.top_k).await {
                Ok(hits) => (Pathway::Rag, format_context(&hits)),
                Err(e) => {
                    warn!("retrieval failed, answering without context: {}", e);
                    (Pathway::None, String::new())
                }
            },
            None => (Pathway::None, String::new()),
        };

        let messages = [
            ChatMessage::system(self.config.system_prompt.as_str()),
            ChatMessage::user(format!("Context:\n{}\n\nQuestion: {}", context, question)),
        ];

        let raw = self.backend.chat(&messages).await?;
        let answer = extract_answer(&raw).unwrap_or_else(|| truncated_raw(&raw));

        Ok(QueryResponse {
            answer,
            pathway,
            latency_s: started.elapsed().as_secs_f64(),
        })
    }
}

fn contains_injection(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INJECTION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

fn format_context(hits: &[RetrievedChunk]) -> String {
    hits.iter()
        .map(|hit| format!("[source={}] {}", hit.source, hit.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Pull the answer text out of a backend response.
///
/// Deployed backends disagree on the response shape, so this applies a
/// closed, ordered list of extraction rules; anything else falls through to
/// the serialize-and-truncate fallback at the call site. No further shapes
/// are ever inferred.
fn extract_answer(response: &Value) -> Option<String> {
    match response {
        Value::Object(_) => {
            if response["message"].is_object() {
                if let Some(content) = response["message"]["content"].as_str() {
                    return Some(content.to_string());
                }
            }
            if let Some(content) = response["output"][0]["content"].as_str() {
                return Some(content.to_string());
            }
            if let Some(content) = response["choices"][0]["message"]["content"].as_str() {
                return Some(content.to_string());
            }
            None
        }
        Value::Array(items) => {
            let first = items.first()?;
            for key in ["message", "output"] {
                let nested = &first[key];
                if nested.is_object() {
                    if let Some(content) =
                        nested["content"].as_str().or_else(|| nested["text"].as_str())
                    {
                        return Some(content.to_string());
                    }
                }
            }
            None
        }
        _ => None,
    }
}

fn truncated_raw(response: &Value) -> String {
    response.to_string().chars().take(RAW_ANSWER_LIMIT).collect()
}

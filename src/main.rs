use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

// Import from our modular crates
use askdocs_cli::{Telemetry, display_banner, handle_input_with_history, print_help};
use askdocs_core::{ChatBackend, EmbeddingProvider};
use askdocs_index::FlatIndex;
use askdocs_ollama::OllamaClient;
use askdocs_rag::{
    IngestConfig, PipelineConfig, QueryPipeline, Retriever, build_index, load_documents,
};

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Ask questions about your local documents", long_about = None)]
struct Cli {
    /// Path of the binary vector artifact (overrides INDEX_PATH)
    #[arg(long)]
    index: Option<PathBuf>,

    /// Path of the metadata artifact (overrides META_PATH)
    #[arg(long)]
    meta: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of .txt / .md documents
    Ingest {
        /// Directory holding the documents
        #[arg(long)]
        docs: PathBuf,

        /// Window length in words
        #[arg(long, default_value_t = 800)]
        chunk_size: usize,

        /// Words shared between consecutive windows
        #[arg(long, default_value_t = 200)]
        chunk_overlap: usize,
    },
    /// Ask a single question and exit
    Ask { question: String },
    /// Report whether an index is loaded
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();

    let index_path = cli
        .index
        .clone()
        .unwrap_or_else(|| env_path("INDEX_PATH", "index.bin"));
    let meta_path = cli
        .meta
        .clone()
        .unwrap_or_else(|| env_path("META_PATH", "meta.json"));

    match cli.command {
        Some(Commands::Ingest {
            docs,
            chunk_size,
            chunk_overlap,
        }) => {
            let client = OllamaClient::from_env()?;
            ingest(
                &client,
                &docs,
                &index_path,
                &meta_path,
                chunk_size,
                chunk_overlap,
            )
            .await
        }
        Some(Commands::Ask { question }) => {
            let (pipeline, telemetry) = build_pipeline(&index_path, &meta_path)?;
            answer_once(&pipeline, &telemetry, &question).await
        }
        Some(Commands::Health) => {
            let (pipeline, _) = build_pipeline(&index_path, &meta_path)?;
            println!(
                "{}",
                serde_json::json!({"status": "ok", "index_loaded": pipeline.index_loaded()})
            );
            Ok(())
        }
        None => {
            let (pipeline, telemetry) = build_pipeline(&index_path, &meta_path)?;
            interactive(&pipeline, &telemetry).await
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Load the index once at startup. A missing or corrupt index degrades to a
/// pipeline without retrieval instead of refusing to start.
fn build_pipeline(
    index_path: &Path,
    meta_path: &Path,
) -> Result<(QueryPipeline<OllamaClient, Arc<OllamaClient>>, Telemetry)> {
    let client = Arc::new(OllamaClient::from_env()?);
    let config = PipelineConfig::from_env();

    let pipeline = match FlatIndex::load(index_path, meta_path) {
        Ok(index) => {
            println!(
                "{} Loaded index {} (dim={}, entries={})",
                "✅".green(),
                index_path.display(),
                index.dim(),
                index.len()
            );
            let retriever = Retriever::new(client.clone(), Arc::new(RwLock::new(index)));
            QueryPipeline::with_retriever(client.clone(), retriever, config)
        }
        Err(e) => {
            println!(
                "{} No usable index at {}: {}",
                "⚠️".yellow(),
                index_path.display(),
                e
            );
            println!(
                "{}",
                "   Answers will not cite documents. Run `askdocs ingest` to build an index."
                    .dimmed()
            );
            QueryPipeline::new(client.clone(), config)
        }
    };

    let telemetry = Telemetry::new(env_path("TELEMETRY_PATH", "telemetry.log"));
    Ok((pipeline, telemetry))
}

async fn ingest(
    client: &OllamaClient,
    docs_dir: &Path,
    index_path: &Path,
    meta_path: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<()> {
    let documents = load_documents(docs_dir)?;
    if documents.is_empty() {
        anyhow::bail!("no .txt or .md documents found under {}", docs_dir.display());
    }

    println!(
        "{} Chunking and embedding {} documents...",
        "📄".blue(),
        documents.len()
    );
    let config = IngestConfig {
        chunk_size,
        chunk_overlap,
        ..Default::default()
    };
    let index = build_index(client, &documents, &config).await?;
    index.save(index_path, meta_path)?;

    println!(
        "{} Saved index with {} entries (dim={}) to {} and {}",
        "✅".green(),
        index.len(),
        index.dim(),
        index_path.display(),
        meta_path.display()
    );
    Ok(())
}

async fn answer_once<E: EmbeddingProvider, B: ChatBackend>(
    pipeline: &QueryPipeline<E, B>,
    telemetry: &Telemetry,
    question: &str,
) -> Result<()> {
    match pipeline.answer(question).await {
        Ok(response) => {
            println!("{}", response.answer);
            println!(
                "{}",
                format!(
                    "pathway={} latency={:.2}s",
                    response.pathway, response.latency_s
                )
                .dimmed()
            );
            telemetry.log_request(
                question,
                response.pathway,
                response.latency_s,
                pipeline.index_loaded(),
            );
            Ok(())
        }
        Err(e) if e.is_client_error() => {
            println!("{} {}", "❌".red(), e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn interactive<E: EmbeddingProvider, B: ChatBackend>(
    pipeline: &QueryPipeline<E, B>,
    telemetry: &Telemetry,
) -> Result<()> {
    display_banner(pipeline.index_loaded());

    let mut history = Vec::new();

    loop {
        let input = handle_input_with_history(&mut history).await?;

        if input.is_empty() {
            // Piped stdin returns empty input at end of file.
            if !std::io::stdin().is_terminal() {
                break;
            }
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        if input_lower == "health" {
            println!(
                "{}",
                serde_json::json!({"status": "ok", "index_loaded": pipeline.index_loaded()})
            );
            continue;
        }

        println!("{} Thinking...", "🤖".blue());

        match pipeline.answer(&input).await {
            Ok(response) => {
                println!("{}", response.answer.bold());
                println!(
                    "{}",
                    format!(
                        "pathway={} latency={:.2}s",
                        response.pathway, response.latency_s
                    )
                    .dimmed()
                );
                telemetry.log_request(
                    &input,
                    response.pathway,
                    response.latency_s,
                    pipeline.index_loaded(),
                );
            }
            Err(e) if e.is_client_error() => {
                println!("{} {}", "❌".red(), e);
            }
            Err(e) => {
                println!("{} Answer failed: {}", "❌".red(), e);
            }
        }
    }

    Ok(())
}

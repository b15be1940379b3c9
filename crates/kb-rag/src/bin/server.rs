//! Knowledge-base QA binary
//!
//! Run with: cargo run -p kb-rag -- serve

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use kb_rag::{
    config::KbConfig,
    ingestion::{SourceLoader, TextChunker},
    knowledge_base::KnowledgeBase,
    providers,
    qa::QaService,
    server::KbServer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kb-rag", version, about = "Answer questions from a fixed set of documents")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "KB_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Document source (Drive link, URL or path); replaces the configured list
    #[arg(short, long = "source")]
    sources: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the knowledge base and serve the HTTP API
    Serve,
    /// Build the knowledge base, answer one question and exit
    Ask {
        /// The question to answer
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kb_rag=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = KbConfig::load(cli.config.as_deref())?;
    if !cli.sources.is_empty() {
        config.sources.documents = cli.sources;
    }
    config.validate()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Sources: {}", config.sources.documents.len());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - LLM: {:?} {}", config.llm.backend, config.llm.model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - Top k: {}", config.retrieval.top_k);

    let (embedder, llm) = providers::from_config(&config)?;

    if !embedder.health_check().await.unwrap_or(false) {
        tracing::warn!(
            "Embedding service not available at {}; the build will fail without it",
            config.embeddings.base_url
        );
    }

    let loader = SourceLoader::new(config.sources.load_timeout_secs)?;
    let chunker = TextChunker::new(config.chunking.chunk_size);
    let built = KnowledgeBase::from_locations(
        config.sources.documents.as_slice(),
        &loader,
        embedder.as_ref(),
        &chunker,
    )
    .await;

    let kb = match built {
        Ok(kb) => Arc::new(kb),
        Err(e) => {
            tracing::error!("Knowledge base build failed: {}", e);
            return Err(e.into());
        }
    };

    let qa = QaService::new(kb, embedder, llm).with_top_k(config.retrieval.top_k);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Ask { question } => {
            println!("{}", qa.answer(&question).await);
        }
        Command::Serve => {
            let server = KbServer::new(config, qa);

            println!("\nServer starting...");
            println!("  API: http://{}", server.address());
            println!("  Health: http://{}/health", server.address());
            println!("  API Info: http://{}/api/info", server.address());
            println!("\nPress Ctrl+C to stop\n");

            server.start().await?;
        }
    }

    Ok(())
}

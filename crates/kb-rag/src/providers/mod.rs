//! Provider abstractions for document loading, embeddings and answer generation
//!
//! Every network-backed collaborator sits behind a trait so the core can run
//! against the deterministic fakes in [`memory`].

pub mod document_loader;
pub mod embedding;
pub mod groq;
pub mod llm;
pub mod memory;
pub mod ollama;

use std::sync::Arc;

use crate::config::{KbConfig, LlmBackend};
use crate::error::Result;

pub use document_loader::DocumentLoader;
pub use embedding::{embed_batch_checked, embed_checked, EmbeddingProvider};
pub use llm::LlmProvider;

/// Build the embedding and LLM providers selected by the configuration
pub fn from_config(
    config: &KbConfig,
) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(ollama::OllamaEmbedder::new(&config.embeddings)?);

    let llm: Arc<dyn LlmProvider> = match config.llm.backend {
        LlmBackend::Groq => {
            tracing::info!("Using Groq for answer generation ({})", config.llm.model);
            Arc::new(groq::GroqLlm::new(&config.llm)?)
        }
        LlmBackend::Ollama => {
            tracing::info!("Using Ollama for answer generation ({})", config.llm.model);
            Arc::new(ollama::OllamaLlm::new(&config.llm)?)
        }
    };

    Ok((embedder, llm))
}

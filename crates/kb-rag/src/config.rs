//! Configuration for the knowledge-base QA system

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable holding the Groq API key
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Documents making up the corpus
    pub sources: SourcesConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Answer generation configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

impl KbConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Fill secrets and overrides from the process environment
    pub fn apply_env(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var(GROQ_API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }

    /// Reject configurations the system cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.embeddings.dimensions == 0 {
            return Err(Error::Config("embeddings.dimensions must be positive".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.sources.documents.is_empty() {
            return Err(Error::Config("sources.documents is empty".to_string()));
        }
        if self.llm.backend == LlmBackend::Groq && self.llm.api_key.is_none() {
            return Err(Error::Config(format!(
                "Groq backend selected but {} is not set",
                GROQ_API_KEY_ENV
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
            enable_cors: true,
        }
    }
}

/// Corpus sources
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Google Drive links, URLs or local paths, in corpus order
    pub documents: Vec<String>,
    /// Per-source load timeout in seconds
    pub load_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            documents: vec![
                "https://drive.google.com/file/d/1sFbj-m4gHPU1vaY49nTtcGSsOkQ87lJM/view?usp=sharing"
                    .to_string(),
                "https://drive.google.com/file/d/1javaraiucbTQfzKc465YKJtz30SN3OIA/view?usp=sharing"
                    .to_string(),
            ],
            load_timeout_secs: 120,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::ingestion::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Embedding configuration (Ollama embeddings API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions, fixed for the process lifetime
    pub dimensions: usize,
    /// Texts per batch request
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimensions: 384,
            batch_size: 32,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Answer generator backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Groq hosted chat completions
    #[default]
    Groq,
    /// Local Ollama server
    Ollama,
}

/// Answer generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend answers questions
    pub backend: LlmBackend,
    /// Base URL of the backend API
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// API key (Groq only); read from `GROQ_API_KEY` when unset
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Groq,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks handed to the generator per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::retrieval::DEFAULT_TOP_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> KbConfig {
        let mut config = KbConfig::default();
        config.llm.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_defaults() {
        let config = KbConfig::default();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.sources.documents.len(), 2);
        assert_eq!(config.llm.backend, LlmBackend::Groq);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = KbConfig::from_toml(
            r#"
            [chunking]
            chunk_size = 200

            [llm]
            backend = "ollama"
            base_url = "http://localhost:11434"
            model = "llama3.2:3b"

            [sources]
            documents = ["./docs/handbook.pdf"]
            "#,
        )
        .unwrap();

        assert_eq!(config.chunking.chunk_size, 200);
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.sources.documents, vec!["./docs/handbook.pdf"]);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.embeddings.dimensions, 384);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = valid();
        config.chunking.chunk_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = valid();
        config.retrieval.top_k = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = valid();
        config.sources.documents.clear();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = valid();
        config.llm.api_key = None;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_bad_toml_is_error() {
        assert!(matches!(
            KbConfig::from_toml("[chunking]\nchunk_size = \"many\""),
            Err(Error::Toml(_))
        ));
    }
}

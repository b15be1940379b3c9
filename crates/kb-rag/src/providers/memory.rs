//! Deterministic in-memory providers
//!
//! Stand-ins for the network-backed collaborators so the whole pipeline can
//! run without Ollama, Groq or document downloads.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::generation::NOT_FOUND_ANSWER;
use crate::types::DocumentSource;

use super::document_loader::DocumentLoader;
use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Loader serving fixed texts keyed by source location
#[derive(Debug, Default)]
pub struct InMemoryLoader {
    documents: HashMap<String, std::result::Result<String, String>>,
}

impl InMemoryLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `location`
    pub fn with_document(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(location.into(), Ok(text.into()));
        self
    }

    /// Fail with `message` for `location`
    pub fn with_failure(mut self, location: impl Into<String>, message: impl Into<String>) -> Self {
        self.documents.insert(location.into(), Err(message.into()));
        self
    }
}

#[async_trait]
impl DocumentLoader for InMemoryLoader {
    async fn load(&self, source: &DocumentSource) -> Result<String> {
        let location = source.location();
        match self.documents.get(&location) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(Error::unreadable(location, message.clone())),
            None => Err(Error::unreadable(location, "no such document")),
        }
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Lowercased alphanumeric tokens
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// 64-bit FNV-1a, stable across platforms and releases
fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

/// Bag-of-words embedder using the hashing trick
///
/// Each token bumps one of `dimensions` buckets and the result is
/// L2-normalised, so texts sharing more words end up closer under L2.
#[derive(Debug)]
pub struct HashingEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl HashingEmbedder {
    /// Create an embedder producing `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed`/`embed_batch` calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let bucket = (fnv1a(&token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "by", "do", "does", "for", "from", "how", "in", "is", "it",
    "of", "on", "or", "the", "to", "was", "what", "when", "where", "which", "who", "why", "with",
];

/// Generator that honours the not-found contract by keyword grounding
///
/// Answers with the leading context chunk when at least one content word of
/// the question appears in the context; otherwise replies with
/// [`NOT_FOUND_ANSWER`].
#[derive(Debug, Default)]
pub struct GroundedEchoLlm {
    unavailable: bool,
}

impl GroundedEchoLlm {
    /// Create a working generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator whose every call fails
    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

#[async_trait]
impl LlmProvider for GroundedEchoLlm {
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
        if self.unavailable {
            return Err(Error::generator("connection refused"));
        }

        let context_words: HashSet<String> = tokens(context).collect();
        let grounded = tokens(question)
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
            .any(|t| context_words.contains(&t));

        if !grounded {
            return Ok(NOT_FOUND_ANSWER.to_string());
        }

        let leading = context.split("\n\n").next().unwrap_or_default();
        Ok(format!("According to the documents: {}", leading))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.unavailable)
    }

    fn name(&self) -> &str {
        "grounded-echo"
    }

    fn model(&self) -> &str {
        "keyword"
    }
}

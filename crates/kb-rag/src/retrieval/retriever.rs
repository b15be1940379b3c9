//! Query-time retrieval and context assembly

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::knowledge_base::KnowledgeBase;
use crate::providers::{embed_checked, EmbeddingProvider};
use crate::types::RetrievedChunk;

/// Chunks handed to the generator unless configured otherwise
pub const DEFAULT_TOP_K: usize = 3;

/// Embeds questions and pulls the closest chunks out of the knowledge base
#[derive(Clone)]
pub struct Retriever {
    kb: Arc<KnowledgeBase>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever over a built knowledge base
    pub fn new(kb: Arc<KnowledgeBase>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { kb, embedder }
    }

    /// The knowledge base being searched
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    /// The `k` closest chunks to `question`, closest first
    ///
    /// Fails with `EmptyQuery` before touching the embedder when the
    /// question is blank. Index positions without a matching chunk are
    /// dropped.
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let query = embed_checked(self.embedder.as_ref(), question).await?;
        let hits = self.kb.index().search(&query, k)?;

        let results: Vec<RetrievedChunk> = hits
            .into_iter()
            .filter_map(|hit| match self.kb.chunk(hit.position) {
                Some(text) => Some(RetrievedChunk {
                    position: hit.position,
                    distance: hit.distance,
                    text: text.to_string(),
                }),
                None => {
                    tracing::warn!(
                        "Index returned position {} but corpus has {} chunks",
                        hit.position,
                        self.kb.len()
                    );
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Retrieved {} chunks: {:?}",
            results.len(),
            results.iter().map(|r| (r.position, r.distance)).collect::<Vec<_>>()
        );

        Ok(results)
    }

    /// Context string for `question`: the `k` closest chunks joined by blank lines
    ///
    /// Empty when no chunk survives.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<String> {
        let results = self.search(question, k).await?;
        Ok(Self::context_for(&results))
    }

    /// Generator context for ranked results, in rank order
    pub fn context_for(results: &[RetrievedChunk]) -> String {
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        PromptBuilder::build_context(&texts)
    }
}

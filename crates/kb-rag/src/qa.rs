//! Question answering over the knowledge base
//!
//! [`QaService`] is the query boundary: it never returns an error. Blank
//! questions, retrieval failures and generator outages all come back as a
//! human-readable answer string so a serving loop can hand them straight
//! to the user.

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{Retriever, DEFAULT_TOP_K};
use crate::types::{QueryResponse, RetrievedChunk};

/// Reply for an empty or whitespace-only question
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Reply when the question could not be embedded or searched
pub const RETRIEVAL_FAILED_MESSAGE: &str =
    "Could not search the knowledge base right now. Please try again in a moment.";

/// Reply when the answer generator could not be reached
pub const GENERATION_FAILED_MESSAGE: &str =
    "The answer service is temporarily unavailable. Please try again in a moment.";

/// Render an answer for display
pub fn format_answer(answer: &str) -> String {
    format!("### Answer\n\n{}", answer.trim())
}

/// Retrieval plus grounded generation
#[derive(Clone)]
pub struct QaService {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl QaService {
    /// Create a service answering from `kb`
    pub fn new(
        kb: Arc<KnowledgeBase>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            retriever: Retriever::new(kb, embedder),
            llm,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Number of chunks handed to the generator (at least 1)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Chunks handed to the generator per question
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The knowledge base being queried
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        self.retriever.knowledge_base()
    }

    /// The underlying retriever
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// The answer generator
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Ranked chunks for `question` without generating an answer
    pub async fn search(&self, question: &str, top_k: Option<usize>) -> Result<Vec<RetrievedChunk>> {
        self.retriever
            .search(question, top_k.unwrap_or(self.top_k))
            .await
    }

    /// Answer `question`; failures are rendered into the answer text
    pub async fn ask(&self, question: &str) -> QueryResponse {
        let start = Instant::now();
        let (answer, chunks_retrieved) = self.answer_inner(question).await;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Query completed in {}ms, {} chunks",
            processing_time_ms,
            chunks_retrieved
        );

        QueryResponse::new(answer, chunks_retrieved, processing_time_ms)
    }

    /// Answer `question` as display text
    pub async fn answer(&self, question: &str) -> String {
        self.ask(question).await.answer
    }

    async fn answer_inner(&self, question: &str) -> (String, usize) {
        let question = question.trim();
        tracing::info!("Query: \"{}\"", question);

        let results = match self.retriever.search(question, self.top_k).await {
            Ok(results) => results,
            Err(Error::EmptyQuery) => return (EMPTY_QUESTION_MESSAGE.to_string(), 0),
            Err(e) => {
                tracing::error!("Retrieval failed: {}", e);
                return (RETRIEVAL_FAILED_MESSAGE.to_string(), 0);
            }
        };

        let context = Retriever::context_for(&results);
        if context.is_empty() {
            tracing::warn!("No chunks survived retrieval; generating with empty context");
        }

        match self.llm.generate_answer(question, &context).await {
            Ok(answer) => (format_answer(&answer), results.len()),
            Err(e) => {
                tracing::error!("Answer generation failed ({}): {}", self.llm.name(), e);
                (GENERATION_FAILED_MESSAGE.to_string(), results.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::NOT_FOUND_ANSWER;
    use crate::providers::memory::{GroundedEchoLlm, HashingEmbedder};
    use async_trait::async_trait;

    async fn service(llm: GroundedEchoLlm) -> (QaService, Arc<HashingEmbedder>) {
        let embedder = Arc::new(HashingEmbedder::new(128));
        let chunks = vec![
            "The sky is blue.".to_string(),
            "Water boils at 100 degrees.".to_string(),
        ];
        let embeddings = embedder.embed_batch(&chunks).await.unwrap();
        let kb = Arc::new(KnowledgeBase::from_parts(chunks, embeddings).unwrap());
        let qa = QaService::new(kb, embedder.clone(), Arc::new(llm)).with_top_k(1);
        (qa, embedder)
    }

    #[tokio::test]
    async fn test_grounded_answer_is_formatted() {
        let (qa, _) = service(GroundedEchoLlm::new()).await;
        let response = qa.ask("What color is the sky?").await;
        assert_eq!(
            response.answer,
            "### Answer\n\nAccording to the documents: The sky is blue."
        );
        assert_eq!(response.chunks_retrieved, 1);
    }

    #[tokio::test]
    async fn test_not_found_passes_through() {
        let (qa, _) = service(GroundedEchoLlm::new()).await;
        let answer = qa.answer("What is the capital of France?").await;
        assert_eq!(answer, format_answer(NOT_FOUND_ANSWER));
    }

    #[tokio::test]
    async fn test_empty_question_never_reaches_embedder() {
        let (qa, embedder) = service(GroundedEchoLlm::new()).await;
        let before = embedder.calls();

        assert_eq!(qa.answer("").await, EMPTY_QUESTION_MESSAGE);
        assert_eq!(qa.answer("  \n ").await, EMPTY_QUESTION_MESSAGE);
        assert_eq!(embedder.calls(), before);
    }

    #[tokio::test]
    async fn test_generator_outage_becomes_notice() {
        let (qa, _) = service(GroundedEchoLlm::unavailable()).await;
        let response = qa.ask("What color is the sky?").await;
        assert_eq!(response.answer, GENERATION_FAILED_MESSAGE);
        assert_eq!(response.chunks_retrieved, 1);
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("connection refused"))
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_retrieval_failure_becomes_notice() {
        let kb = Arc::new(KnowledgeBase::from_parts(vec!["a".into()], vec![vec![0.0, 1.0]]).unwrap());
        let qa = QaService::new(kb, Arc::new(BrokenEmbedder), Arc::new(GroundedEchoLlm::new()));

        let response = qa.ask("anything").await;
        assert_eq!(response.answer, RETRIEVAL_FAILED_MESSAGE);
        assert_eq!(response.chunks_retrieved, 0);
    }

    #[test]
    fn test_top_k_floor() {
        let kb = Arc::new(KnowledgeBase::from_parts(vec!["a".into()], vec![vec![1.0]]).unwrap());
        let qa = QaService::new(kb, Arc::new(HashingEmbedder::new(1)), Arc::new(GroundedEchoLlm::new()))
            .with_top_k(0);
        assert_eq!(qa.top_k(), 1);
    }
}

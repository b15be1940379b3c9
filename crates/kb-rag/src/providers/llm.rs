//! LLM provider trait for generating answers

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-based answer generation
///
/// Implementations are expected to answer with
/// [`NOT_FOUND_ANSWER`](crate::generation::NOT_FOUND_ANSWER) when the
/// context holds nothing that supports an answer. Failures surface as
/// `Error::GeneratorUnavailable`.
///
/// Implementations:
/// - `GroqLlm`: Groq hosted chat completions (llama-3.3-70b-versatile)
/// - `OllamaLlm`: Local Ollama server
/// - `GroundedEchoLlm`: keyword-grounded stand-in, for tests
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate an answer to `question` using only `context`
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

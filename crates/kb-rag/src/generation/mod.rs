//! Answer generation clients and prompt handling

pub mod groq;
pub mod ollama;
pub mod prompt;
pub mod retry;

pub use groq::GroqClient;
pub use ollama::OllamaClient;
pub use prompt::{PromptBuilder, NOT_FOUND_ANSWER};

//! Groq-hosted LLM provider

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::{GroqClient, PromptBuilder};

use super::llm::LlmProvider;

/// Groq chat-completions provider for answer generation
pub struct GroqLlm {
    client: GroqClient,
    model: String,
    temperature: f32,
}

impl GroqLlm {
    /// Create a new Groq provider; the config must carry an API key
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("Groq API key is missing".to_string()))?;
        let client = GroqClient::new(
            &config.base_url,
            api_key,
            config.timeout_secs,
            config.max_retries,
        )?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmProvider for GroqLlm {
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
        let prompt = PromptBuilder::build_grounded_prompt(question, context);
        self.client
            .complete(&self.model, &prompt, self.temperature)
            .await
            .map_err(|e| match e {
                Error::GeneratorUnavailable(_) => e,
                other => Error::generator(other.to_string()),
            })
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

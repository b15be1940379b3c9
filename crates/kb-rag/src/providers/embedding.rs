//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// The dimensionality is fixed when the provider is constructed and every
/// vector it returns must match it; use [`embed_checked`] and
/// [`embed_batch_checked`] to enforce that at call sites.
///
/// Implementations:
/// - `OllamaEmbedder`: Local Ollama server (all-minilm, nomic-embed-text)
/// - `HashingEmbedder`: deterministic bag-of-words vectors, for tests
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch)
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Embed one text and check it against the provider's dimensions
pub async fn embed_checked(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    let vector = provider.embed(text).await?;
    check_dimensions(provider.dimensions(), &vector)?;
    Ok(vector)
}

/// Embed a batch and check both the count and every vector's dimensions
pub async fn embed_batch_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    let vectors = provider.embed_batch(texts).await?;
    if vectors.len() != texts.len() {
        return Err(Error::embedding(format!(
            "{} returned {} embeddings for {} texts",
            provider.name(),
            vectors.len(),
            texts.len()
        )));
    }
    let expected = provider.dimensions();
    for vector in &vectors {
        check_dimensions(expected, vector)?;
    }
    Ok(vectors)
}

fn check_dimensions(expected: usize, vector: &[f32]) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder {
        dimensions: usize,
        produced: usize,
        drop_last: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.5; self.produced])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let n = if self.drop_last { texts.len().saturating_sub(1) } else { texts.len() };
            Ok(vec![vec![0.5; self.produced]; n])
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_checked_embed_accepts_matching_dimensions() {
        let provider = FixedEmbedder { dimensions: 4, produced: 4, drop_last: false };
        assert_eq!(embed_checked(&provider, "hi").await.unwrap().len(), 4);
        let batch = embed_batch_checked(&provider, &["a".into(), "b".into()]).await.unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_checked_embed_rejects_wrong_dimensions() {
        let provider = FixedEmbedder { dimensions: 4, produced: 3, drop_last: false };
        let err = embed_checked(&provider, "hi").await.unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 4, actual: 3 }));

        let err = embed_batch_checked(&provider, &["a".into()]).await.unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_checked_batch_rejects_short_batch() {
        let provider = FixedEmbedder { dimensions: 2, produced: 2, drop_last: true };
        let err = embed_batch_checked(&provider, &["a".into(), "b".into()]).await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}

//! Startup build of the immutable knowledge base

use futures::future::join_all;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ingestion::TextChunker;
use crate::providers::{embed_batch_checked, DocumentLoader, EmbeddingProvider};
use crate::retrieval::VectorIndex;
use crate::types::DocumentSource;

/// A source that loaded successfully
#[derive(Debug, Clone, Serialize)]
pub struct LoadedSource {
    /// Source location
    pub location: String,
    /// Chunks it contributed
    pub chunks: usize,
}

/// A source that was skipped
#[derive(Debug, Clone, Serialize)]
pub struct FailedSource {
    /// Source location
    pub location: String,
    /// Why it was skipped
    pub error: String,
}

/// What happened to each source during the build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Sources that loaded, in corpus order
    pub loaded: Vec<LoadedSource>,
    /// Sources that failed and were skipped
    pub failed: Vec<FailedSource>,
}

/// Chunks, their embeddings and the index over them
///
/// Built once at startup and read-only afterwards, so it can be shared
/// across concurrent queries behind an `Arc` without locking.
/// `chunks[i]`, `embeddings[i]` and index position `i` always refer to the
/// same fragment.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    index: VectorIndex,
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    report: BuildReport,
}

impl KnowledgeBase {
    /// Assemble a knowledge base from already-embedded chunks
    pub fn from_parts(chunks: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::internal(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let index = VectorIndex::build(&embeddings)?;

        Ok(Self {
            index,
            chunks,
            embeddings,
            report: BuildReport::default(),
        })
    }

    /// Load, chunk and embed every source, then index the result
    ///
    /// Sources are fetched concurrently but chunks keep source order, then
    /// in-source order. Sources that fail to load are skipped and logged;
    /// the build only fails when nothing usable remains (`EmptyCorpus`) or
    /// the embeddings are inconsistent (`DimensionMismatch`).
    pub async fn build(
        sources: &[DocumentSource],
        loader: &dyn DocumentLoader,
        embedder: &dyn EmbeddingProvider,
        chunker: &TextChunker,
    ) -> Result<Self> {
        Self::log_start(sources.len(), loader, embedder);

        let loads = join_all(sources.iter().map(|source| loader.load(source))).await;
        let outcomes = sources.iter().map(DocumentSource::location).zip(loads);

        Self::assemble(outcomes, embedder, chunker).await
    }

    /// Like [`build`](Self::build), starting from configured source strings
    ///
    /// A string that does not parse (such as a Drive link without a file id)
    /// is reported as a failed source at its position, like a failed load.
    pub async fn from_locations<S: AsRef<str>>(
        locations: &[S],
        loader: &dyn DocumentLoader,
        embedder: &dyn EmbeddingProvider,
        chunker: &TextChunker,
    ) -> Result<Self> {
        Self::log_start(locations.len(), loader, embedder);

        let loads = join_all(locations.iter().map(|raw| {
            let parsed = DocumentSource::parse(raw.as_ref());
            async move {
                match parsed {
                    Ok(source) => loader.load(&source).await,
                    Err(e) => Err(e),
                }
            }
        }))
        .await;
        let outcomes = locations
            .iter()
            .map(|raw| raw.as_ref().trim().to_string())
            .zip(loads);

        Self::assemble(outcomes, embedder, chunker).await
    }

    fn log_start(count: usize, loader: &dyn DocumentLoader, embedder: &dyn EmbeddingProvider) {
        tracing::info!(
            "Building knowledge base from {} sources (loader: {}, embedder: {})",
            count,
            loader.name(),
            embedder.name()
        );
    }

    /// Chunk loaded texts in order, record failures, embed and index
    async fn assemble(
        outcomes: impl Iterator<Item = (String, Result<String>)>,
        embedder: &dyn EmbeddingProvider,
        chunker: &TextChunker,
    ) -> Result<Self> {
        let mut chunks = Vec::new();
        let mut report = BuildReport::default();

        for (location, result) in outcomes {
            match result {
                Ok(text) => {
                    let source_chunks = chunker.chunk(&text);
                    if source_chunks.is_empty() {
                        tracing::warn!("{} contained no extractable text", location);
                    } else {
                        tracing::info!("{}: {} chunks", location, source_chunks.len());
                    }
                    report.loaded.push(LoadedSource {
                        location,
                        chunks: source_chunks.len(),
                    });
                    chunks.extend(source_chunks);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", location, e);
                    report.failed.push(FailedSource {
                        location,
                        error: e.to_string(),
                    });
                }
            }
        }

        if chunks.is_empty() {
            tracing::error!(
                "No usable text in any source ({} failed, {} empty)",
                report.failed.len(),
                report.loaded.len()
            );
            return Err(Error::EmptyCorpus);
        }

        let embeddings = embed_batch_checked(embedder, &chunks).await?;
        let mut kb = Self::from_parts(chunks, embeddings)?;
        kb.report = report;

        tracing::info!(
            "Loaded {} chunks into the vector index ({} dimensions)",
            kb.len(),
            kb.dimensions()
        );

        Ok(kb)
    }

    /// The vector index
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// All chunks in corpus order
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Chunk text at `position`
    pub fn chunk(&self, position: usize) -> Option<&str> {
        self.chunks.get(position).map(String::as_str)
    }

    /// All embeddings, aligned with `chunks()`
    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    /// Per-source outcome of the build
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Number of chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if there are no chunks (never true after a successful build)
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    /// Split into `(index, chunks, embeddings)`
    pub fn into_parts(self) -> (VectorIndex, Vec<String>, Vec<Vec<f32>>) {
        (self.index, self.chunks, self.embeddings)
    }

    /// Index with more entries than chunks, for exercising the retriever's bound check
    #[cfg(test)]
    pub(crate) fn with_extra_index_entries(mut self, vectors: &[Vec<f32>]) -> Result<Self> {
        for vector in vectors {
            self.index.add(vector)?;
        }
        Ok(self)
    }
}

/// Build the knowledge base; see [`KnowledgeBase::build`]
pub async fn build_knowledge_base(
    sources: &[DocumentSource],
    loader: &dyn DocumentLoader,
    embedder: &dyn EmbeddingProvider,
    chunker: &TextChunker,
) -> Result<KnowledgeBase> {
    KnowledgeBase::build(sources, loader, embedder, chunker).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::SourceLoader;
    use crate::providers::memory::{HashingEmbedder, InMemoryLoader};

    fn sources(raw: &[&str]) -> Vec<DocumentSource> {
        raw.iter().map(|s| DocumentSource::parse(s).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_build_keeps_source_order() {
        let loader = InMemoryLoader::new()
            .with_document("a.txt", "one two three four five")
            .with_document("b.txt", "six seven")
            .with_document("c.txt", "eight nine ten");
        let embedder = HashingEmbedder::new(32);

        let kb = build_knowledge_base(
            &sources(&["a.txt", "b.txt", "c.txt"]),
            &loader,
            &embedder,
            &TextChunker::new(2),
        )
        .await
        .unwrap();

        assert_eq!(
            kb.chunks(),
            &["one two", "three four", "five", "six seven", "eight nine", "ten"]
        );
        assert_eq!(kb.len(), kb.embeddings().len());
        assert_eq!(kb.len(), kb.index().len());
        assert_eq!(kb.dimensions(), 32);
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_skipped_and_reported() {
        let loader = InMemoryLoader::new()
            .with_document("a.txt", "The sky is blue.")
            .with_failure("b.pdf", "download failed: HTTP 404")
            .with_document("c.txt", "Water boils at 100 degrees.");
        let embedder = HashingEmbedder::new(32);

        let kb = build_knowledge_base(
            &sources(&["a.txt", "b.pdf", "c.txt"]),
            &loader,
            &embedder,
            &TextChunker::default(),
        )
        .await
        .unwrap();

        assert_eq!(kb.chunks(), &["The sky is blue.", "Water boils at 100 degrees."]);
        assert_eq!(kb.report().loaded.len(), 2);
        assert_eq!(kb.report().failed.len(), 1);
        assert_eq!(kb.report().failed[0].location, "b.pdf");
        assert!(kb.report().failed[0].error.contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_fatal() {
        let loader = InMemoryLoader::new()
            .with_document("blank.txt", "   \n  ")
            .with_failure("bad.pdf", "corrupt");
        let embedder = HashingEmbedder::new(8);

        let err = build_knowledge_base(
            &sources(&["blank.txt", "bad.pdf"]),
            &loader,
            &embedder,
            &TextChunker::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::EmptyCorpus));
        assert!(err.is_fatal_at_startup());
        assert_eq!(embedder.calls(), 0);

        let err = build_knowledge_base(&[], &loader, &embedder, &TextChunker::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn test_from_parts_validation() {
        let err = KnowledgeBase::from_parts(vec!["a".into()], vec![]).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));

        let err = KnowledgeBase::from_parts(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 0.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));

        let kb = KnowledgeBase::from_parts(vec!["a".into()], vec![vec![0.5, 0.5]]).unwrap();
        assert_eq!(kb.chunk(0), Some("a"));
        assert_eq!(kb.chunk(1), None);

        let (index, chunks, embeddings) = kb.into_parts();
        assert_eq!((index.len(), chunks.len(), embeddings.len()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_unparseable_location_is_reported_in_order() {
        let loader = InMemoryLoader::new()
            .with_document("a.txt", "The sky is blue.")
            .with_document("c.txt", "Water boils at 100 degrees.");
        let embedder = HashingEmbedder::new(32);

        let kb = KnowledgeBase::from_locations(
            &["a.txt", " https://drive.google.com/open?usp=sharing ", "c.txt"],
            &loader,
            &embedder,
            &TextChunker::default(),
        )
        .await
        .unwrap();

        assert_eq!(kb.chunks(), &["The sky is blue.", "Water boils at 100 degrees."]);
        let report = kb.report();
        assert_eq!(report.loaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].location, "https://drive.google.com/open?usp=sharing");
        assert!(report.failed[0].error.contains("invalid Google Drive link"));
    }

    #[tokio::test]
    async fn test_pdf_that_crashes_extraction_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = dir.path().join("a.txt");
        let bad = dir.path().join("bad.pdf");
        let good_c = dir.path().join("c.txt");
        std::fs::write(&good_a, "Alpha text about comets.").unwrap();
        std::fs::write(&bad, crate::ingestion::fixtures::undefined_font_pdf()).unwrap();
        std::fs::write(&good_c, "Gamma text about rivers.").unwrap();

        let locations: Vec<String> = [&good_a, &bad, &good_c]
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let loader = SourceLoader::new(5).unwrap();
        let embedder = HashingEmbedder::new(32);

        let kb = KnowledgeBase::from_locations(
            locations.as_slice(),
            &loader,
            &embedder,
            &TextChunker::default(),
        )
        .await
        .unwrap();

        assert_eq!(kb.chunks(), &["Alpha text about comets.", "Gamma text about rivers."]);
        assert_eq!(kb.report().failed.len(), 1);
        assert_eq!(kb.report().failed[0].location, locations[1]);
        assert!(kb.report().failed[0].error.contains("PDF extraction crashed"));
    }
}

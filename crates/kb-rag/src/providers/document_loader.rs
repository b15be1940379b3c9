//! Document loader trait for turning a source into plain text

use async_trait::async_trait;

use crate::error::Result;
use crate::types::DocumentSource;

/// Trait for fetching a document and extracting its text
///
/// Implementations:
/// - `SourceLoader`: Google Drive / HTTP download or local file, PDF or text
/// - `InMemoryLoader`: fixed texts, for tests
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Fetch and extract the text of one source
    ///
    /// Fails with `Error::UnreadableSource` when the source cannot be
    /// fetched or parsed.
    async fn load(&self, source: &DocumentSource) -> Result<String>;

    /// Get loader name for logging
    fn name(&self) -> &str;
}

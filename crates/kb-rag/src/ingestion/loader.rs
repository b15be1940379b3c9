//! Source loader: download or read a document, then extract its text

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::DocumentLoader;
use crate::types::DocumentSource;

use super::parser::FileParser;

/// Turns fetched bytes into text; runs on the blocking pool
///
/// The first argument is the source location, for error messages.
pub type Extractor = fn(&str, &[u8]) -> Result<String>;

/// Loads Google Drive, HTTP(S) and local-file sources
pub struct SourceLoader {
    client: Client,
    timeout: Duration,
    extractor: Extractor,
}

impl SourceLoader {
    /// Create a loader; `timeout_secs` bounds both download and extraction
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            timeout,
            extractor: FileParser::extract,
        })
    }

    /// Replace the text extractor (defaults to [`FileParser::extract`])
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Bound extraction separately from the download timeout
    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, source: &DocumentSource) -> Result<Vec<u8>> {
        let location = source.location();

        let url = match (source, source.download_url()) {
            (DocumentSource::File(path), _) => {
                return tokio::fs::read(path)
                    .await
                    .map_err(|e| Error::unreadable(location, e.to_string()));
            }
            (_, Some(url)) => url,
            (_, None) => return Err(Error::unreadable(location, "no download URL")),
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::unreadable(&location, format!("download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::unreadable(
                location,
                format!("download failed: HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::unreadable(&location, format!("download interrupted: {}", e)))?;

        if matches!(source, DocumentSource::GoogleDrive { .. }) && looks_like_html(&bytes) {
            return Err(Error::unreadable(
                location,
                "Google Drive returned an HTML page instead of the file (not shared publicly, or too large to skip the virus scan)",
            ));
        }

        Ok(bytes.to_vec())
    }
}

fn looks_like_html(data: &[u8]) -> bool {
    let head: String = String::from_utf8_lossy(&data[..data.len().min(256)])
        .trim_start()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[async_trait]
impl DocumentLoader for SourceLoader {
    async fn load(&self, source: &DocumentSource) -> Result<String> {
        let location = source.location();
        let data = self.fetch(source).await?;
        tracing::debug!("Fetched {} bytes from {}", data.len(), location);

        let label = location.clone();
        let extract = self.extractor;
        let extraction = tokio::task::spawn_blocking(move || extract(&label, &data));

        match tokio::time::timeout(self.timeout, extraction).await {
            Ok(Ok(result)) => result,
            // A panic that escapes the extractor ends the task, not the process
            Ok(Err(e)) => Err(Error::unreadable(location, format!("extraction task failed: {}", e))),
            // The blocking task cannot be cancelled; it runs to completion and its result is dropped
            Err(_) => Err(Error::unreadable(
                location,
                format!("text extraction timed out after {:?}", self.timeout),
            )),
        }
    }

    fn name(&self) -> &str {
        "source"
    }
}

//! Plain-text extraction from downloaded document bytes

use crate::error::{Error, Result};

/// Detected document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// PDF document
    Pdf,
    /// UTF-8 text (plain, markdown, ...)
    Text,
}

impl DocumentFormat {
    /// Sniff the format from the leading bytes
    pub fn detect(data: &[u8]) -> Self {
        let trimmed = data
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map_or(&data[..0], |start| &data[start..]);

        if trimmed.starts_with(b"%PDF") {
            Self::Pdf
        } else {
            Self::Text
        }
    }
}

/// Replace ligatures and typographic spacing left behind by PDF fonts
fn cleanup_pdf_text(text: &str) -> String {
    text.replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace('\u{000C}', "\n")
}

/// Text extractor for the supported formats
pub struct FileParser;

impl FileParser {
    /// Extract plain text from a document's bytes
    ///
    /// `location` only labels errors. PDF extraction is CPU-bound and may
    /// take a while on large files, so call this from a blocking context.
    pub fn extract(location: &str, data: &[u8]) -> Result<String> {
        match DocumentFormat::detect(data) {
            DocumentFormat::Pdf => Self::extract_pdf(location, data),
            DocumentFormat::Text => Self::extract_utf8(location, data),
        }
    }

    fn extract_pdf(location: &str, data: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed fonts instead of returning an error
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
            .map_err(|_| Error::unreadable(location, "PDF extraction crashed"))?
            .map_err(|e| Error::unreadable(location, format!("PDF extraction failed: {}", e)))?;
        Ok(cleanup_pdf_text(&text))
    }

    fn extract_utf8(location: &str, data: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::unreadable(location, format!("not valid UTF-8 text: {}", e)))?;
        Ok(text.strip_prefix('\u{FEFF}').unwrap_or(text).to_string())
    }
}

//! Word-window text chunking

/// Words per chunk unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Split text into consecutive, non-overlapping windows of `chunk_size` words
///
/// Tokens are whitespace-delimited and rejoined with single spaces. Every
/// window holds exactly `chunk_size` words except possibly the last one.
/// A `chunk_size` of zero is treated as one.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(chunk_size)
        .map(|window| window.join(" "))
        .collect()
}

/// Text chunker with a fixed word budget
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Words per chunk
    chunk_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Words per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk a document's extracted text
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.chunk_size)
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

//! Response types for knowledge-base queries

use serde::{Deserialize, Serialize};

/// Answer returned at the query boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Formatted answer, or a human-readable notice when something failed
    pub answer: String,
    /// Number of chunks passed to the generator
    pub chunks_retrieved: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl QueryResponse {
    /// Create a response
    pub fn new(answer: String, chunks_retrieved: usize, processing_time_ms: u64) -> Self {
        Self {
            answer,
            chunks_retrieved,
            processing_time_ms,
        }
    }
}

/// One ranked chunk in a search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Position of the chunk in the corpus
    pub position: usize,
    /// Squared L2 distance to the query
    pub distance: f32,
    /// Chunk text
    pub text: String,
}

/// Response from the diagnostic search route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Chunks in ascending distance order
    pub results: Vec<RetrievedChunk>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

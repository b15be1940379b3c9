//! Query request types

use serde::{Deserialize, Serialize};

/// Question submitted at the query boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

/// Diagnostic retrieval request, returns ranked chunks without generating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Text to embed and search for
    pub question: String,

    /// Number of chunks to retrieve (defaults to the configured top_k)
    #[serde(default)]
    pub top_k: Option<usize>,
}

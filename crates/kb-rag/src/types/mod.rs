//! Core types for the knowledge-base QA system

pub mod query;
pub mod response;
pub mod source;

pub use query::{QueryRequest, SearchRequest};
pub use response::{QueryResponse, RetrievedChunk, SearchResponse};
pub use source::DocumentSource;

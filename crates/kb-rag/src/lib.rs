//! kb-rag: question answering over a small, fixed document corpus
//!
//! Documents are loaded once at startup, split into fixed word windows,
//! embedded and held in an exact L2 index. Each question retrieves the
//! closest chunks and hands them to an LLM instructed to answer only from
//! that context.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod knowledge_base;
pub mod providers;
pub mod qa;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::KbConfig;
pub use error::{Error, Result};
pub use knowledge_base::{build_knowledge_base, BuildReport, KnowledgeBase};
pub use qa::QaService;
pub use retrieval::{Retriever, VectorIndex};
pub use types::{DocumentSource, QueryRequest, QueryResponse};

//! Document ingestion: loading sources and chunking their text

mod chunker;
mod loader;
mod parser;

pub use chunker::{chunk_text, TextChunker, DEFAULT_CHUNK_SIZE};
pub use loader::{Extractor, SourceLoader};
pub use parser::{DocumentFormat, FileParser};

#[cfg(test)]
pub(crate) use parser::fixtures;

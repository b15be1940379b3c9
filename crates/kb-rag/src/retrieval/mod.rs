//! Vector index and query-time retrieval

pub mod index;
pub mod retriever;

pub use index::{squared_l2, SearchHit, VectorIndex};
pub use retriever::{Retriever, DEFAULT_TOP_K};

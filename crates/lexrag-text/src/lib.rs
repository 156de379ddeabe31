//! lexrag-text
//!
//! Keyword retrieval over the inverted index and the heuristic reranker that
//! rescores candidates against their chunk text.
pub mod rerank;
pub mod retriever;

pub use rerank::{proximity_bonus, term_frequency, title_bonus, SimpleReranker};
pub use retriever::KeywordRetriever;

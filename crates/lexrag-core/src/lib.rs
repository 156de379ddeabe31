//! lexrag-core
//!
//! Data model, seam traits, configuration, text normalization, tracing and the
//! corpus data processor shared by the lexrag crates.

pub mod config;
pub mod data_processor;
pub mod error;
pub mod store;
pub mod text;
pub mod trace;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{sort_hits, Answer, Chunk, ChunkId, Citation, Hit, IndexEntry, Intent, InvertedIndex};

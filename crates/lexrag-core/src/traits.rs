use crate::types::{Answer, Chunk, ChunkId, Hit, Intent, InvertedIndex};

/// Stage seams of the question-answering pipeline. Every stage is pure and
/// infallible: missing data degrades to empty output, never to an error.
pub trait IntentDetector: Send + Sync {
    fn detect(&self, question: &str) -> Intent;
}

pub trait QueryWriter: Send + Sync {
    fn write(&self, question: &str, intent: Intent) -> Vec<String>;
}

pub trait Retriever: Send + Sync {
    fn retrieve(&self, query_terms: &[String], index: &InvertedIndex) -> Vec<Hit>;
}

/// Rescores `hits` in place and leaves them in ranking order.
pub trait Reranker: Send + Sync {
    fn rerank(&self, query_terms: &[String], hits: &mut Vec<Hit>);
}

pub trait AnswerAgent: Send + Sync {
    fn answer(&self, question: &str, ranked_hits: &[Hit]) -> Answer;
}

/// Resolves a hit identity back to its chunk.
pub trait ChunkLookup: Send + Sync {
    fn chunk(&self, doc_id: &str, chunk_id: ChunkId) -> Option<&Chunk>;
}

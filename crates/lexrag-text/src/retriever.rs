use std::collections::{HashMap, HashSet};

use tracing::debug;

use lexrag_core::traits::Retriever;
use lexrag_core::types::{sort_hits, ChunkId, Hit, InvertedIndex};

/// Weight of one distinct matched term. Large enough that coordinate count
/// always dominates the summed term frequency.
pub const COORDINATE_WEIGHT: f64 = 1000.0;

#[derive(Default)]
struct Accumulator<'a> {
    tf_sum: u64,
    matched: HashSet<&'a str>,
}

/// Coordinate-matching retriever: `score = distinct_terms * 1000 + tf_sum`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordRetriever;

impl KeywordRetriever {
    pub fn new() -> Self { Self }
}

impl Retriever for KeywordRetriever {
    fn retrieve(&self, query_terms: &[String], index: &InvertedIndex) -> Vec<Hit> {
        let mut by_chunk: HashMap<(&str, ChunkId), Accumulator<'_>> = HashMap::new();
        for term in query_terms {
            let Some(postings) = index.get(term) else { continue };
            for entry in postings {
                let acc = by_chunk.entry((entry.doc_id.as_str(), entry.chunk_id)).or_default();
                acc.tf_sum += u64::from(entry.tf);
                acc.matched.insert(term.as_str());
            }
        }

        let mut hits: Vec<Hit> = by_chunk
            .into_iter()
            .map(|((doc_id, chunk_id), acc)| {
                let score = acc.matched.len() as f64 * COORDINATE_WEIGHT + acc.tf_sum as f64;
                Hit::new(doc_id, chunk_id, score)
            })
            .collect();
        sort_hits(&mut hits);
        debug!(terms = query_terms.len(), hits = hits.len(), "retrieved");
        hits
    }
}

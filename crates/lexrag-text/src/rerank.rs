//! Heuristic reranking.
//!
//! Every hit whose chunk resolves is rescored from scratch:
//! `10 * occurrences + proximity bonus (5) + title bonus (3)`.
//! Hits whose chunk cannot be resolved keep their retrieval score.

use tracing::debug;

use lexrag_core::traits::{ChunkLookup, Reranker};
use lexrag_core::types::{sort_hits, Hit};

pub const TF_WEIGHT: f64 = 10.0;
pub const PROXIMITY_BONUS: f64 = 5.0;
pub const PROXIMITY_WINDOW: usize = 15;
pub const TITLE_BONUS: f64 = 3.0;

fn lowered_terms(query_terms: &[String]) -> Vec<String> {
    query_terms.iter().filter(|t| !t.is_empty()).map(|t| t.to_lowercase()).collect()
}

/// Non-overlapping occurrences of every term in `text_lower`, summed over terms.
pub fn term_frequency(text_lower: &str, terms_lower: &[String]) -> usize {
    terms_lower.iter().filter(|t| !t.is_empty()).map(|t| text_lower.matches(t.as_str()).count()).sum()
}

/// Bonus when the first occurrences of two terms start within the window of
/// each other. Positions are character offsets; absent terms are skipped.
pub fn proximity_bonus(text_lower: &str, terms_lower: &[String]) -> f64 {
    let mut positions: Vec<usize> = terms_lower
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| text_lower.find(t.as_str()))
        .map(|byte| text_lower[..byte].chars().count())
        .collect();
    if positions.len() < 2 {
        return 0.0;
    }
    positions.sort_unstable();
    if positions.windows(2).any(|w| w[1] - w[0] <= PROXIMITY_WINDOW) { PROXIMITY_BONUS } else { 0.0 }
}

/// Bonus when any term appears in the document id.
pub fn title_bonus(doc_id: &str, terms_lower: &[String]) -> f64 {
    let title = doc_id.to_lowercase();
    if terms_lower.iter().any(|t| !t.is_empty() && title.contains(t.as_str())) { TITLE_BONUS } else { 0.0 }
}

/// Rescore and resort `hits` against the chunks available through `lookup`.
pub fn rerank_hits<L: ChunkLookup + ?Sized>(query_terms: &[String], hits: &mut Vec<Hit>, lookup: &L) {
    let terms = lowered_terms(query_terms);
    let mut resolved = 0usize;
    for hit in hits.iter_mut() {
        let Some(chunk) = lookup.chunk(&hit.doc_id, hit.chunk_id) else { continue };
        let text = chunk.text.to_lowercase();
        hit.score = term_frequency(&text, &terms) as f64 * TF_WEIGHT
            + proximity_bonus(&text, &terms)
            + title_bonus(&hit.doc_id, &terms);
        hit.chunk_text = Some(chunk.text.clone());
        resolved += 1;
    }
    sort_hits(hits);
    debug!(hits = hits.len(), resolved, "reranked");
}

/// Reranker bound to a chunk source.
pub struct SimpleReranker<L> {
    lookup: L,
}

impl<L: ChunkLookup> SimpleReranker<L> {
    pub fn new(lookup: L) -> Self { Self { lookup } }
}

impl<L: ChunkLookup> Reranker for SimpleReranker<L> {
    fn rerank(&self, query_terms: &[String], hits: &mut Vec<Hit>) {
        rerank_hits(query_terms, hits, &self.lookup);
    }
}

//! Accuracy evaluation against a gold JSONL set.

use std::io::BufRead;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lexrag_core::error::{Error, Result};
use lexrag_core::types::{Answer, ChunkId, Hit};

use crate::orchestrator::RagOrchestrator;

/// Ranked documents inspected by coverage@k unless told otherwise.
pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct EvalItem {
    pub question: String,
    pub expected_doc: String,
    #[serde(default)]
    pub expected_chunk: Option<ChunkId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    pub question: String,
    pub top_doc: Option<String>,
    /// Distinct document ids in rank order.
    pub ranked_docs: Vec<String>,
    pub doc_match: bool,
    pub chunk_match: bool,
    /// Expected document among the first `k` ranked documents.
    pub covered: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub n: usize,
    pub mean_ms: f64,
    pub p50_ms: u64,
    pub p95_ms: u64,
}

impl LatencyStats {
    /// Nearest-rank-below percentiles over the sorted samples. `None` when empty.
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let at = |p: f64| sorted[(p * (sorted.len() - 1) as f64) as usize];
        Some(Self {
            n: sorted.len(),
            mean_ms: sorted.iter().sum::<u64>() as f64 / sorted.len() as f64,
            p50_ms: at(0.50),
            p95_ms: at(0.95),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub total: usize,
    pub doc_matches: usize,
    /// Items carrying an expected chunk.
    pub chunk_total: usize,
    pub chunk_matches: usize,
    pub k: usize,
    pub covered: usize,
    #[serde(skip)]
    latencies_ms: Vec<u64>,
}

impl Default for EvalSummary {
    fn default() -> Self { Self::with_k(DEFAULT_K) }
}

impl EvalSummary {
    pub fn with_k(k: usize) -> Self {
        Self { total: 0, doc_matches: 0, chunk_total: 0, chunk_matches: 0, k, covered: 0, latencies_ms: Vec::new() }
    }

    pub fn doc_accuracy(&self) -> f64 { ratio(self.doc_matches, self.total) }

    pub fn chunk_accuracy(&self) -> f64 { ratio(self.chunk_matches, self.chunk_total) }

    pub fn coverage_at_k(&self) -> f64 { ratio(self.covered, self.total) }

    pub fn latency(&self) -> Option<LatencyStats> { LatencyStats::from_samples(&self.latencies_ms) }

    fn add(&mut self, item: &EvalItem, result: &EvalResult) {
        self.total += 1;
        self.doc_matches += usize::from(result.doc_match);
        self.covered += usize::from(result.covered);
        if item.expected_chunk.is_some() {
            self.chunk_total += 1;
            self.chunk_matches += usize::from(result.chunk_match);
        }
        self.latencies_ms.push(result.latency_ms);
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 { 0.0 } else { n as f64 / d as f64 }
}

/// Chunk id from a `P<n>` section label.
fn chunk_from_label(label: &str) -> Option<ChunkId> {
    label.strip_prefix('P')?.parse().ok()
}

/// Distinct doc ids from the ranked hits, or from the citations when there are none.
fn ranked_docs(answer: &Answer, hits: &[Hit]) -> Vec<String> {
    let mut docs: Vec<String> = Vec::new();
    let ids: Vec<&str> = if hits.is_empty() {
        answer.citations.iter().map(|c| c.doc_id.as_str()).collect()
    } else {
        hits.iter().map(|h| h.doc_id.as_str()).collect()
    };
    for id in ids {
        if !docs.iter().any(|d| d == id) {
            docs.push(id.to_string());
        }
    }
    docs
}

/// Score one run against its gold item.
pub fn score_answer(item: &EvalItem, answer: &Answer, hits: &[Hit], k: usize, latency_ms: u64) -> EvalResult {
    let expected = item.expected_doc.to_lowercase();
    let is_expected = |doc: &str| doc.to_lowercase().contains(&expected);

    let top = answer.citations.first();
    let doc_match = top.is_some_and(|c| is_expected(c.doc_id.as_str()));
    let chunk_match = doc_match
        && match (item.expected_chunk, top.and_then(|c| c.section_label.as_deref()).and_then(chunk_from_label)) {
            (Some(want), Some(got)) => want == got,
            _ => false,
        };
    let ranked = ranked_docs(answer, hits);
    let covered = ranked.iter().take(k).any(|d| is_expected(d.as_str()));
    EvalResult {
        question: item.question.clone(),
        top_doc: top.map(|c| c.doc_id.clone()),
        ranked_docs: ranked,
        doc_match,
        chunk_match,
        covered,
        latency_ms,
    }
}

pub fn evaluate_item(orchestrator: &RagOrchestrator, item: &EvalItem, k: usize) -> EvalResult {
    let started = Instant::now();
    let (answer, hits) = orchestrator.run_ranked(&item.question);
    let latency = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    score_answer(item, &answer, &hits, k, latency)
}

/// Run every gold item in `input`. Blank lines are skipped.
pub fn evaluate<R: BufRead>(orchestrator: &RagOrchestrator, input: R, k: usize) -> Result<(Vec<EvalResult>, EvalSummary)> {
    let mut results = Vec::new();
    let mut summary = EvalSummary::with_k(k);
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item: EvalItem =
            serde_json::from_str(&line).map_err(|e| Error::InvalidInput(format!("line {}: {e}", i + 1)))?;
        let result = evaluate_item(orchestrator, &item, k);
        debug!(question = %item.question, doc_match = result.doc_match, covered = result.covered, "evaluated");
        summary.add(&item, &result);
        results.push(result);
    }
    info!(
        total = summary.total,
        doc_accuracy = summary.doc_accuracy(),
        chunk_accuracy = summary.chunk_accuracy(),
        coverage = summary.coverage_at_k(),
        "evaluation complete"
    );
    Ok((results, summary))
}

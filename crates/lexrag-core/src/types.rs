//! Domain types shared by the retrieval, rerank and answer stages.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

pub type ChunkId = u32;

/// A paragraph-sized slice of a source document, the unit of retrieval.
///
/// - `doc_id`: source document identity (the file name, e.g. `ders_plani.txt`)
/// - `chunk_id`: ordinal, unique within `doc_id`
/// - `text`: the paragraph text, case preserved
/// - `start_offset`/`end_offset`/`section_id`: carried through from ingestion, unused at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub doc_id: String,
    pub chunk_id: ChunkId,
    #[serde(rename = "rawText")]
    pub text: String,
    #[serde(default)]
    pub start_offset: usize,
    #[serde(default)]
    pub end_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

impl Chunk {
    pub fn new(doc_id: impl Into<String>, chunk_id: ChunkId, text: impl Into<String>) -> Self {
        Self { doc_id: doc_id.into(), chunk_id, text: text.into(), start_offset: 0, end_offset: 0, section_id: None }
    }
}

/// One posting: `term` occurs `tf` times in chunk `(doc_id, chunk_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub tf: u32,
}

impl IndexEntry {
    pub fn new(doc_id: impl Into<String>, chunk_id: ChunkId, tf: u32) -> Self {
        Self { doc_id: doc_id.into(), chunk_id, tf }
    }
}

/// Term -> postings. Read-only once loaded; no duplicate `(term, doc_id, chunk_id)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    #[serde(rename = "indexMap", default)]
    postings: HashMap<String, Vec<IndexEntry>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Postings for `term`, if the term was indexed.
    pub fn get(&self, term: &str) -> Option<&[IndexEntry]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Append a posting, rejecting a second entry for the same chunk under the same term.
    pub fn insert(&mut self, term: impl Into<String>, entry: IndexEntry) -> Result<()> {
        let term = term.into();
        let list = self.postings.entry(term.clone()).or_default();
        if list.iter().any(|e| e.doc_id == entry.doc_id && e.chunk_id == entry.chunk_id) {
            return Err(Error::DuplicatePosting { term, doc_id: entry.doc_id, chunk_id: entry.chunk_id });
        }
        list.push(entry);
        Ok(())
    }

    pub fn term_count(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }
}

/// A scored candidate chunk. Identity is `(doc_id, chunk_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    pub doc_id: String,
    pub chunk_id: ChunkId,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_text: Option<String>,
}

impl Hit {
    pub fn new(doc_id: impl Into<String>, chunk_id: ChunkId, score: f64) -> Self {
        Self { doc_id: doc_id.into(), chunk_id, score, chunk_text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.chunk_text = Some(text.into());
        self
    }

    /// Ranking order: score descending, then `doc_id` ascending, then `chunk_id` ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
            .then_with(|| self.chunk_id.cmp(&other.chunk_id))
    }
}

/// Sort hits into ranking order. Stable, so equal tuples keep their relative order.
pub fn sort_hits(hits: &mut [Hit]) {
    hits.sort_by(Hit::rank_cmp);
}

pub const DEFAULT_SECTION: &str = "General";

/// Reference from an answer back to its source chunk, shown as `doc:section:start-end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub doc_id: String,
    #[serde(rename = "sectionId", default)]
    pub section_label: Option<String>,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl Citation {
    pub fn new(doc_id: impl Into<String>, section_label: impl Into<String>, start_offset: usize, end_offset: usize) -> Self {
        Self { doc_id: doc_id.into(), section_label: Some(section_label.into()), start_offset, end_offset }
    }

    pub fn section(&self) -> &str {
        self.section_label.as_deref().unwrap_or(DEFAULT_SECTION)
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}-{}", self.doc_id, self.section(), self.start_offset, self.end_offset)
    }
}

/// Terminal artifact of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub final_text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Answer {
    pub fn new(final_text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self { final_text: final_text.into(), citations }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.final_text)?;
        if !self.citations.is_empty() {
            f.write_str("\n")?;
            for c in &self.citations {
                write!(f, "\n{c}")?;
            }
        }
        Ok(())
    }
}

/// Coarse question category, produced by intent detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    Registration,
    StaffLookup,
    PolicyFaq,
    CourseInfo,
    Unknown,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Registration => "REGISTRATION",
            Intent::StaffLookup => "STAFF_LOOKUP",
            Intent::PolicyFaq => "POLICY_FAQ",
            Intent::CourseInfo => "COURSE_INFO",
            Intent::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

//! Corpus ingestion: split `.txt` documents into paragraph chunks and build the
//! keyword index over them. Runs once, ahead of query time.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::IndexerSettings;
use crate::error::{Error, Result};
use crate::text::{char_len, index_tokens};
use crate::types::{Chunk, ChunkId, IndexEntry, InvertedIndex};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Paragraphs shorter than this many characters (after trimming) are dropped.
    pub min_paragraph_len: usize,
    /// Index tokens shorter than this many characters are dropped.
    pub min_token_len: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { min_paragraph_len: 5, min_token_len: 3 }
    }
}

impl From<&IndexerSettings> for ChunkingConfig {
    fn from(s: &IndexerSettings) -> Self {
        Self { min_paragraph_len: s.min_paragraph_len, min_token_len: s.min_token_len }
    }
}

#[derive(Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let files = self.list_txt_files(data_dir)?;
        if files.is_empty() {
            info!(dir = %data_dir.display(), "no .txt files found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), n = file_index + 1, total = files.len(), "processing");
            all_chunks.extend(self.process_file(data_dir, file_path)?);
        }
        info!(files = files.len(), chunks = all_chunks.len(), "processed corpus");
        Ok(all_chunks)
    }

    /// Chunk one file. Its document id is the path relative to `data_dir`.
    pub fn process_file(&self, data_dir: &Path, file_path: &Path) -> Result<Vec<Chunk>> {
        let content = self.read_file_content(file_path)?;
        let doc_id = self.extract_doc_id(data_dir, file_path)?;
        Ok(self.chunk_content(&content, &doc_id))
    }

    fn read_file_content(&self, file_path: &Path) -> Result<String> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
        }
    }

    fn extract_doc_id(&self, data_dir: &Path, file_path: &Path) -> Result<String> {
        let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        let parts: Vec<String> = relative.components().map(|c| c.as_os_str().to_string_lossy().to_string()).collect();
        if parts.is_empty() {
            return Err(Error::InvalidInput(format!("no file name in {}", file_path.display())));
        }
        Ok(parts.join("/"))
    }

    /// One chunk per kept paragraph, chunk ids counting kept paragraphs only.
    pub fn chunk_content(&self, content: &str, doc_id: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut chunk_id: ChunkId = 0;
        for (byte_start, paragraph) in split_paragraphs(content) {
            let trimmed = paragraph.trim();
            if char_len(trimmed) < self.chunking_config.min_paragraph_len {
                continue;
            }
            let lead = paragraph.len() - paragraph.trim_start().len();
            let start = char_len(&content[..byte_start + lead]);
            let mut chunk = Chunk::new(doc_id, chunk_id, trimmed);
            chunk.start_offset = start;
            chunk.end_offset = start + char_len(trimmed);
            chunks.push(chunk);
            chunk_id += 1;
        }
        chunks
    }

    /// Inverted index over `chunks` with per-chunk term frequencies.
    pub fn build_index(&self, chunks: &[Chunk]) -> Result<InvertedIndex> {
        let mut index = InvertedIndex::new();
        for c in chunks {
            let mut local_tf: BTreeMap<String, u32> = BTreeMap::new();
            for token in index_tokens(&c.text, self.chunking_config.min_token_len) {
                *local_tf.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in local_tf {
                index.insert(term, IndexEntry::new(c.doc_id.clone(), c.chunk_id, tf))?;
            }
        }
        debug!(terms = index.term_count(), chunks = chunks.len(), "built index");
        Ok(index)
    }

    pub fn list_txt_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!("corpus directory {}", root.display())));
        }
        let mut txt_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let is_txt = path.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
            if is_txt { txt_files.push(path.to_path_buf()); }
        }
        txt_files.sort();
        Ok(txt_files)
    }
}

/// Split on runs of two or more line breaks (`\n` or `\r\n`). Yields each
/// paragraph with its byte offset in `content`.
fn split_paragraphs(content: &str) -> Vec<(usize, &str)> {
    let bytes = content.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let mut j = i;
        let mut breaks = 0;
        loop {
            if j < bytes.len() && bytes[j] == b'\n' {
                j += 1;
            } else if j + 1 < bytes.len() && bytes[j] == b'\r' && bytes[j + 1] == b'\n' {
                j += 2;
            } else {
                break;
            }
            breaks += 1;
        }
        if breaks >= 2 {
            out.push((start, &content[start..i]));
            start = j;
        }
        i = if j > i { j } else { i + 1 };
    }
    out.push((start, &content[start..]));
    out
}

//! Loading and holding the corpus artifacts produced by ingestion.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::ChunkLookup;
use crate::types::{Chunk, ChunkId, InvertedIndex};

/// In-memory chunk corpus keyed by `(doc_id, chunk_id)`. The first chunk seen
/// for an identity wins.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    by_doc: HashMap<String, BTreeMap<ChunkId, Chunk>>,
    len: usize,
}

impl ChunkStore {
    pub fn new(chunks: impl IntoIterator<Item = Chunk>) -> Self {
        let mut store = Self::default();
        for c in chunks {
            let slot = store.by_doc.entry(c.doc_id.clone()).or_default();
            if let std::collections::btree_map::Entry::Vacant(e) = slot.entry(c.chunk_id) {
                e.insert(c);
                store.len += 1;
            }
        }
        store
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }
}

impl ChunkLookup for ChunkStore {
    fn chunk(&self, doc_id: &str, chunk_id: ChunkId) -> Option<&Chunk> {
        self.by_doc.get(doc_id).and_then(|m| m.get(&chunk_id))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load `chunks.json`: a JSON array of chunks.
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let chunks: Vec<Chunk> = read_json(path)?;
    debug!(path = %path.display(), count = chunks.len(), "loaded chunks");
    Ok(chunks)
}

/// Load `index.json`: `{"indexMap": {term: [posting, ...]}}`.
pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    let index: InvertedIndex = read_json(path)?;
    debug!(path = %path.display(), terms = index.term_count(), "loaded index");
    Ok(index)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn save_chunks(path: &Path, chunks: &[Chunk]) -> Result<()> { write_json(path, &chunks) }

pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> { write_json(path, index) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_keeps_first_duplicate() {
        let store = ChunkStore::new(vec![Chunk::new("d", 0, "first"), Chunk::new("d", 0, "second"), Chunk::new("d", 1, "other")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.chunk("d", 0).map(|c| c.text.as_str()), Some("first"));
        assert!(store.chunk("d", 7).is_none());
        assert!(store.chunk("x", 0).is_none());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_chunks(Path::new("/definitely/not/here/chunks.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn chunks_round_trip_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data/chunks.json");
        let chunks = vec![Chunk::new("a.txt", 0, "alpha"), Chunk::new("a.txt", 1, "bravo")];
        save_chunks(&path, &chunks).unwrap();
        assert_eq!(load_chunks(&path).unwrap(), chunks);
    }

    #[test]
    fn reads_java_style_chunk_records() {
        let json = r#"[{"docId":"ders_plani.txt","chunkId":5,"rawText":"CSE3063","startOffset":0,"endOffset":0,"sectionId":null}]"#;
        let chunks: Vec<Chunk> = serde_json::from_str(json).unwrap();
        assert_eq!(chunks[0].chunk_id, 5);
        assert_eq!(chunks[0].section_id, None);
    }
}

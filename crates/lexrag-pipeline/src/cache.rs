//! Persistent question -> answer cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use lexrag_core::error::Result;
use lexrag_core::text::to_lower_tr;
use lexrag_core::types::Answer;

fn read_entries(path: &Path) -> Result<BTreeMap<String, Answer>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Answers keyed by the trimmed, lowercased question. Stored as a pretty JSON object.
#[derive(Debug, Default)]
pub struct QueryCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Answer>,
}

impl QueryCache {
    /// Cache that never touches the filesystem.
    pub fn in_memory() -> Self { Self::default() }

    /// Load from `path`. A missing file starts empty; an unreadable or corrupt
    /// one is logged and also starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = if path.exists() {
            match read_entries(&path) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable query cache");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "loaded query cache");
        Self { path: Some(path), entries }
    }

    pub fn key(question: &str) -> String { to_lower_tr(question.trim()) }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    pub fn get(&self, question: &str) -> Option<&Answer> { self.entries.get(&Self::key(question)) }

    /// Insert and persist immediately.
    pub fn put(&mut self, question: &str, answer: Answer) -> Result<()> {
        self.entries.insert(Self::key(question), answer);
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrag_core::types::Citation;

    fn answer() -> Answer { Answer::new("Ofis: M2-118", vec![Citation::new("hocalar.txt", "P2", 0, 0)]) }

    #[test]
    fn key_ignores_case_and_padding() {
        let mut cache = QueryCache::in_memory();
        cache.put("  Ayşe Hoca Ofis  ", answer()).unwrap();
        assert_eq!(cache.get("ayşe hoca ofis"), Some(&answer()));
        assert_eq!(QueryCache::key(" IŞIK "), "ışık");
    }

    #[test]
    fn put_persists_camel_case_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache/answers.json");
        let mut cache = QueryCache::load(&path);
        assert!(cache.is_empty());
        cache.put("Ofis?", answer()).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["ofis?"]["finalText"], "Ofis: M2-118");
        assert_eq!(json["ofis?"]["citations"][0]["sectionId"], "P2");

        let reloaded = QueryCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("OFIS?").map(|a| a.final_text.as_str()), None, "dotless ı differs from i");
        assert!(reloaded.get("ofis?").is_some());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(QueryCache::load(&path).is_empty());
    }
}

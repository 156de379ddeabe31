//! Shared setup for the lexrag binaries: logging, configuration and pipeline assembly.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lexrag_core::config::{resolve_with_base, Config, Settings, DEFAULT_CONFIG_FILE};
use lexrag_core::store::{load_chunks, load_index, ChunkStore};
use lexrag_core::trace::{run_log_path, JsonlTraceSink, LogTraceSink};
use lexrag_pipeline::{QueryCache, RagOrchestrator};

/// Logs go to stderr so stdout stays clean for answers. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}

/// Loaded settings plus the directory relative paths resolve against.
pub struct AppContext {
    pub settings: Settings,
    pub base: PathBuf,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config = match config_path {
            Some(p) => Config::load_from(p),
            None => Config::load(),
        }
        .with_context(|| format!("loading {}", path.display()))?;
        let settings = config.settings()?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        debug!(config = %path.display(), base = %base.display(), "configuration loaded");
        Ok(Self { settings, base })
    }

    pub fn resolve(&self, p: &str) -> PathBuf { resolve_with_base(&self.base, p) }

    /// Load chunks and index, then wire the orchestrator with trace sinks and optional cache.
    pub fn orchestrator(&self, use_cache: bool, verbose: bool) -> anyhow::Result<RagOrchestrator> {
        let chunks_path = self.resolve(&self.settings.data.chunks_path);
        let index_path = self.resolve(&self.settings.data.index_path);
        let chunks = load_chunks(&chunks_path).with_context(|| format!("loading {} (run lexrag-indexer first)", chunks_path.display()))?;
        let index = load_index(&index_path).with_context(|| format!("loading {} (run lexrag-indexer first)", index_path.display()))?;
        let store = ChunkStore::new(chunks);
        if store.is_empty() || index.is_empty() {
            warn!(chunks = %chunks_path.display(), "corpus is empty, every question gets the fallback answer");
        }
        info!(chunks = store.len(), terms = index.term_count(), "corpus loaded");

        let mut orch = RagOrchestrator::standard(index, store, &self.settings.pipeline);
        let trace = &self.settings.trace;
        if trace.enabled {
            let log_dir = self.resolve(&trace.log_dir);
            orch = orch
                .with_sink(JsonlTraceSink::new(run_log_path(&log_dir)))
                .with_sink(JsonlTraceSink::new(self.resolve(&trace.global_file)));
        }
        if verbose {
            orch = orch.with_sink(LogTraceSink);
        }
        if use_cache {
            if let Some(cache_path) = &self.settings.pipeline.cache_path {
                let cache = QueryCache::load(self.resolve(cache_path));
                if let Some(p) = cache.path() {
                    debug!(cache = %p.display(), entries = cache.len(), "answer cache enabled");
                }
                orch = orch.with_cache(cache);
            }
        }
        Ok(orch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_config_location() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("config.toml");
        std::fs::write(&cfg, "[data]\nchunks_path = \"out/chunks.json\"\n").unwrap();
        let ctx = AppContext::load(Some(&cfg)).unwrap();
        assert_eq!(ctx.resolve(&ctx.settings.data.chunks_path), dir.path().join("out/chunks.json"));
    }

    #[test]
    fn missing_index_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("config.toml");
        std::fs::write(&cfg, "").unwrap();
        let ctx = AppContext::load(Some(&cfg)).unwrap();
        assert!(ctx.orchestrator(false, false).is_err());
    }

    #[test]
    fn empty_corpus_still_answers_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("config.toml");
        std::fs::write(
            &cfg,
            "[data]\nchunks_path = \"c.json\"\nindex_path = \"i.json\"\n[pipeline]\ncache_path = \"cache.json\"\n[trace]\nenabled = false\n",
        )
        .unwrap();
        lexrag_core::store::save_chunks(&dir.path().join("c.json"), &[]).unwrap();
        lexrag_core::store::save_index(&dir.path().join("i.json"), &Default::default()).unwrap();
        let ctx = AppContext::load(Some(&cfg)).unwrap();
        let answer = ctx.orchestrator(true, false).unwrap().run("staj kaç gün");
        assert!(answer.citations.is_empty());
        assert!(dir.path().join("cache.json").exists());
    }
}

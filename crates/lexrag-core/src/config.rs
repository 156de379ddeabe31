//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Intent;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub corpus_dir: String,
    pub chunks_path: String,
    pub index_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            corpus_dir: "data/corpus".to_string(),
            chunks_path: "data/chunks.json".to_string(),
            index_path: "data/index.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    pub enabled: bool,
    pub log_dir: String,
    pub global_file: String,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self { enabled: true, log_dir: "logs".to_string(), global_file: "rag_trace.jsonl".to_string() }
    }
}

/// One intent rule: any keyword found in the lowercased question selects `intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

/// Optional query expansion. Everything is off by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Append synonym phrases for keys found in the question.
    pub expand_synonyms: bool,
    /// Replaces the built-in synonym table when set.
    pub synonyms: Option<BTreeMap<String, Vec<String>>>,
    /// Also drop detached Turkish suffix particles (`in`, `nın`, `yi`, ...).
    pub drop_suffix_particles: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub cache_path: Option<String>,
    /// Ordered; first match wins. Unset keeps the built-in rules.
    pub intent_rules: Option<Vec<IntentRule>>,
    pub query: QuerySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerSettings {
    pub min_paragraph_len: usize,
    pub min_token_len: usize,
}

impl Default for IndexerSettings {
    fn default() -> Self { Self { min_paragraph_len: 5, min_token_len: 3 } }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub trace: TraceSettings,
    pub pipeline: PipelineSettings,
    pub indexer: IndexerSettings,
}

/// Base config file used when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Base file at `path`, then the env overlay next to it, then `APP_` variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(path));
        let overlay = |suffix: &str| path.with_extension(format!("{suffix}.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(overlay("dev"))),
            "prod" | "production" => figment = figment.merge(Toml::file(overlay("prod"))),
            "test" | "testing" => figment = figment.merge(Toml::file(overlay("test"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let s = self.settings()?;
        if s.indexer.min_token_len == 0 {
            return Err(Error::InvalidConfig("indexer.min_token_len must be at least 1".into()));
        }
        if let Some(rules) = &s.pipeline.intent_rules {
            if let Some(r) = rules.iter().find(|r| r.keywords.is_empty()) {
                return Err(Error::InvalidConfig(format!("intent rule {} has no keywords", r.intent)));
            }
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

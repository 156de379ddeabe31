//! Per-stage trace records and the sinks that receive them.
//!
//! Sinks are handed to the orchestrator explicitly; there is no global registry.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

/// One record per pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceEvent {
    pub stage: String,
    pub inputs: String,
    pub outputs_summary: String,
    pub timing_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl TraceEvent {
    pub fn new(stage: impl Into<String>, inputs: impl Into<String>, outputs_summary: impl Into<String>, timing_ms: u64) -> Self {
        Self {
            stage: stage.into(),
            inputs: inputs.into(),
            outputs_summary: outputs_summary.into(),
            timing_ms,
            errors: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_errors(mut self, errors: impl Into<String>) -> Self {
        let e = errors.into();
        self.errors = if e.is_empty() { None } else { Some(e) };
        self
    }
}

pub trait TraceSink: Send + Sync {
    fn record(&self, event: &TraceEvent);
}

/// Appends one JSON object per line. Write failures are logged and swallowed.
pub struct JsonlTraceSink {
    path: PathBuf,
}

impl JsonlTraceSink {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    fn append(&self, event: &TraceEvent) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(f, "{line}")
    }
}

impl TraceSink for JsonlTraceSink {
    fn record(&self, event: &TraceEvent) {
        if let Err(e) = self.append(event) {
            warn!(path = %self.path.display(), error = %e, "failed to append trace event");
        }
    }
}

/// Forwards trace events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn record(&self, event: &TraceEvent) {
        match &event.errors {
            Some(err) => warn!(stage = %event.stage, timing_ms = event.timing_ms, errors = %err, "{}", event.outputs_summary),
            None => info!(stage = %event.stage, timing_ms = event.timing_ms, inputs = %event.inputs, "{}", event.outputs_summary),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn stages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.stage).collect()
    }
}

impl TraceSink for MemoryTraceSink {
    fn record(&self, event: &TraceEvent) {
        // A panic in another recorder leaves the Vec intact.
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

impl<T: TraceSink + ?Sized> TraceSink for std::sync::Arc<T> {
    fn record(&self, event: &TraceEvent) { (**self).record(event) }
}

/// Per-run trace file name, `run-YYYYMMDD-HHMMSS.jsonl` under `log_dir`.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    log_dir.join(format!("run-{stamp}.jsonl"))
}

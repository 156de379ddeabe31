//! JSONL batch answering.

use std::io::{BufRead, Write};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use lexrag_core::error::{Error, Result};
use lexrag_core::types::Citation;

use crate::orchestrator::RagOrchestrator;

#[derive(Debug, Deserialize)]
struct BatchInput {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub latency_ms: u64,
}

/// Parse one input line. `Ok(None)` for blank lines.
pub(crate) fn parse_question(line: &str, line_no: usize) -> Result<Option<(String, String)>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let input: BatchInput =
        serde_json::from_str(line).map_err(|e| Error::InvalidInput(format!("line {line_no}: {e}")))?;
    let question = input
        .question
        .filter(|q| !q.trim().is_empty())
        .or(input.q)
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("line {line_no}: missing question")))?;
    let id = match input.id {
        Some(serde_json::Value::String(s)) => s,
        Some(v) if !v.is_null() => v.to_string(),
        _ => line_no.to_string(),
    };
    Ok(Some((id, question)))
}

/// Answer every question in `input`, writing one JSON row per question to `out`.
/// `on_row` is called after each row. Returns the number of rows written.
pub fn run_batch<R: BufRead, W: Write>(
    orchestrator: &RagOrchestrator,
    input: R,
    mut out: W,
    mut on_row: impl FnMut(&BatchRow),
) -> Result<usize> {
    let mut written = 0;
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let Some((id, question)) = parse_question(&line, i + 1)? else { continue };
        let started = Instant::now();
        let answer = orchestrator.run(&question);
        let row = BatchRow {
            id,
            question,
            answer: answer.final_text,
            citations: answer.citations,
            latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        serde_json::to_writer(&mut out, &row)?;
        out.write_all(b"\n")?;
        on_row(&row);
        written += 1;
    }
    out.flush()?;
    info!(rows = written, "batch complete");
    Ok(written)
}

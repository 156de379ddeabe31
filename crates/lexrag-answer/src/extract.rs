use std::collections::HashSet;

use tracing::debug;

use lexrag_core::text::{char_len, contains_digit, strip_question, to_lower_tr};
use lexrag_core::traits::AnswerAgent;
use lexrag_core::types::{Answer, Citation, Hit};

use crate::lines::{has_term_marker, is_course_line, is_title_line, HEADER_LOOKBACK};

pub const NO_INFORMATION: &str = "Sorry, I could not find any information regarding this.";

/// Characters of raw chunk text used when no line could be selected.
pub const FALLBACK_CHARS: usize = 300;

/// Tokens this short do not count toward a line's keyword score.
const MIN_SCORING_TOKEN: usize = 3;

/// Extracts an answer from the best hit.
///
/// Questions carrying a digit (course codes such as `CSE3063`) select every
/// line mentioning such a token; other questions select the single line with
/// the most question tokens. Course lines are emitted with their term header,
/// other lines are grown into the surrounding paragraph block.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateAnswerAgent;

impl TemplateAnswerAgent {
    pub fn new() -> Self { Self }
}

/// Line indices worth answering from, in emission order. May repeat an index.
fn select_lines(lines: &[&str], tokens: &[String]) -> Vec<usize> {
    let digit_tokens: Vec<&String> = tokens.iter().filter(|t| contains_digit(t)).collect();
    if !digit_tokens.is_empty() {
        let mut targets = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            let lower = to_lower_tr(line);
            for t in &digit_tokens {
                if lower.contains(t.as_str()) {
                    targets.push(i);
                }
            }
        }
        return targets;
    }

    let mut best: Option<usize> = None;
    let mut max_score: i64 = -1;
    for (i, line) in lines.iter().enumerate() {
        let lower = to_lower_tr(line);
        let score = tokens.iter().filter(|t| char_len(t) >= MIN_SCORING_TOKEN && lower.contains(t.as_str())).count() as i64;
        if score > max_score {
            max_score = score;
            best = Some(i);
        }
    }
    best.into_iter().collect()
}

/// Emit the selected lines with their context, each source line at most once.
fn assemble(lines: &[&str], targets: &[usize]) -> Vec<String> {
    let mut out = Vec::new();
    let mut emitted: HashSet<usize> = HashSet::new();
    let mut emit = |k: usize, out: &mut Vec<String>| {
        if emitted.insert(k) {
            out.push(lines[k].trim().to_string());
        }
    };

    for &idx in targets {
        let line = lines[idx].trim();
        if line.is_empty() {
            continue;
        }
        if is_course_line(line) {
            let floor = idx.saturating_sub(HEADER_LOOKBACK);
            if let Some(k) = (floor..idx).rev().find(|&k| has_term_marker(lines[k])) {
                emit(k, &mut out);
            }
            emit(idx, &mut out);
        } else {
            let mut start = idx;
            while start > 0 {
                let prev = lines[start - 1].trim();
                if prev.is_empty() || is_title_line(prev) {
                    break;
                }
                start -= 1;
            }
            let mut end = idx;
            while end + 1 < lines.len() && !lines[end + 1].trim().is_empty() {
                end += 1;
            }
            for k in start..=end {
                emit(k, &mut out);
            }
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &s[..byte]),
        None => s.to_string(),
    }
}

impl AnswerAgent for TemplateAnswerAgent {
    fn answer(&self, question: &str, ranked_hits: &[Hit]) -> Answer {
        let Some(best) = ranked_hits.first() else {
            return Answer::new(NO_INFORMATION, vec![]);
        };

        let raw_text = best.chunk_text.as_deref().unwrap_or("").replace("\\n", "\n");
        let lines: Vec<&str> = raw_text.split('\n').collect();
        let tokens = strip_question(question);

        let targets = select_lines(&lines, &tokens);
        let picked = assemble(&lines, &targets);
        debug!(doc = %best.doc_id, chunk = best.chunk_id, targets = targets.len(), lines = picked.len(), "extracted");

        let mut final_text = picked.join("\n").trim().to_string();
        if final_text.is_empty() {
            final_text = truncate_chars(&raw_text, FALLBACK_CHARS);
        }

        // Offsets are not tracked back into the chunk; always 0-0.
        let citation = Citation::new(best.doc_id.clone(), format!("P{}", best.chunk_id), 0, 0);
        Answer::new(final_text, vec![citation])
    }
}

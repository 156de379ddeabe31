//! lexrag-answer
//!
//! Builds the final answer from the top-ranked chunk: picks the relevant lines,
//! grows them into a readable block and attaches a citation.
pub mod extract;
pub mod lines;

pub use extract::{TemplateAnswerAgent, NO_INFORMATION};

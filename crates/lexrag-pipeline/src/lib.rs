//! lexrag-pipeline
//!
//! Intent detection, query writing and the orchestrator that runs a question
//! through retrieval, reranking and answer extraction. Also batch and
//! evaluation drivers over JSONL files.

pub mod batch;
pub mod cache;
pub mod eval;
pub mod intent;
pub mod orchestrator;
pub mod query;

pub use batch::{run_batch, BatchRow};
pub use cache::QueryCache;
pub use eval::{evaluate, evaluate_item, EvalItem, EvalResult, EvalSummary, LatencyStats, DEFAULT_K};
pub use intent::RuleBasedIntentDetector;
pub use orchestrator::RagOrchestrator;
pub use query::HeuristicQueryWriter;

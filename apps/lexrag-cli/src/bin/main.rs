//! `lexrag`: answer questions over an indexed corpus.
//!
//! - `lexrag ask --q "<question>"` prints the answer and its citations
//! - `lexrag batch --input q.jsonl --out a.jsonl` answers a JSONL file
//! - `lexrag eval --input gold.jsonl [--k 5]` reports accuracy, coverage@k and latency

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use lexrag_cli::{init_logging, AppContext};
use lexrag_pipeline::{evaluate, run_batch, DEFAULT_K};

#[derive(Parser)]
#[command(name = "lexrag")]
#[command(about = "Keyword question answering over a closed document corpus")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ignore the answer cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// Question text
        #[arg(long)]
        q: String,
    },

    /// Answer every question of a JSONL file
    Batch {
        /// Input lines: {"id"?, "question" | "q"}
        #[arg(long)]
        input: PathBuf,

        /// Output JSONL file
        #[arg(long)]
        out: PathBuf,
    },

    /// Measure accuracy against a gold JSONL file
    Eval {
        /// Input lines: {"question", "expected_doc", "expected_chunk"?}
        #[arg(long)]
        input: PathBuf,

        /// Ranked documents inspected for coverage@k
        #[arg(long, default_value_t = DEFAULT_K)]
        k: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let ctx = AppContext::load(cli.config.as_deref())?;
    let orchestrator = ctx.orchestrator(!cli.no_cache, cli.verbose)?;

    match cli.command {
        Commands::Ask { q } => {
            println!("{}", orchestrator.run(&q));
        }
        Commands::Batch { input, out } => {
            let reader = BufReader::new(File::open(&input).with_context(|| format!("opening {}", input.display()))?);
            let writer = BufWriter::new(File::create(&out).with_context(|| format!("creating {}", out.display()))?);
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} questions {msg}")?);
            let rows = run_batch(&orchestrator, reader, writer, |row| {
                pb.inc(1);
                pb.set_message(row.id.clone());
            })?;
            pb.finish_and_clear();
            println!("Wrote {} answers to {}", rows, out.display());
        }
        Commands::Eval { input, k } => {
            let reader = BufReader::new(File::open(&input).with_context(|| format!("opening {}", input.display()))?);
            let (results, summary) = evaluate(&orchestrator, reader, k)?;
            for r in &results {
                let mark = match (r.doc_match, r.chunk_match) {
                    (true, true) => "OK   ",
                    (true, false) => "DOC  ",
                    _ => "MISS ",
                };
                println!("{mark}{} -> {} ({}ms)", r.question, r.top_doc.as_deref().unwrap_or("-"), r.latency_ms);
            }
            println!(
                "\nDoc accuracy:   {:.1}% ({}/{})\nChunk accuracy: {:.1}% ({}/{})",
                summary.doc_accuracy() * 100.0,
                summary.doc_matches,
                summary.total,
                summary.chunk_accuracy() * 100.0,
                summary.chunk_matches,
                summary.chunk_total,
            );
            println!("Coverage@{}:     {:.1}% ({}/{})", summary.k, summary.coverage_at_k() * 100.0, summary.covered, summary.total);
            if let Some(l) = summary.latency() {
                println!("Latency (n={}): mean {:.1}ms, p50 {}ms, p95 {}ms", l.n, l.mean_ms, l.p50_ms, l.p95_ms);
            }
        }
    }
    Ok(())
}

//! `lexrag-indexer`: chunk a corpus of `.txt` files and write chunks + inverted index as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use lexrag_cli::{init_logging, AppContext};
use lexrag_core::data_processor::{ChunkingConfig, DataProcessor};
use lexrag_core::store::{save_chunks, save_index};

#[derive(Parser)]
#[command(name = "lexrag-indexer")]
#[command(about = "Build the chunk file and keyword index for a corpus")]
#[command(version)]
struct Args {
    /// Corpus directory (default: data.corpus_dir)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Write chunks.json and index.json here instead of the configured paths
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Path to config file (default: ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    let ctx = AppContext::load(args.config.as_deref())?;

    let corpus = args.corpus.unwrap_or_else(|| ctx.resolve(&ctx.settings.data.corpus_dir));
    let (chunks_path, index_path) = match &args.out_dir {
        Some(dir) => (dir.join("chunks.json"), dir.join("index.json")),
        None => (ctx.resolve(&ctx.settings.data.chunks_path), ctx.resolve(&ctx.settings.data.index_path)),
    };

    let processor = DataProcessor::with_config(ChunkingConfig::from(&ctx.settings.indexer));
    let files = processor.list_txt_files(&corpus).with_context(|| format!("scanning {}", corpus.display()))?;
    println!("Corpus: {} ({} files)", corpus.display(), files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );
    let mut chunks = Vec::new();
    for file in &files {
        pb.set_message(file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
        chunks.extend(processor.process_file(&corpus, file)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let index = processor.build_index(&chunks)?;
    save_chunks(&chunks_path, &chunks)?;
    save_index(&index_path, &index)?;
    info!(files = files.len(), chunks = chunks.len(), terms = index.term_count(), "index written");

    println!("Chunks: {} -> {}", chunks.len(), chunks_path.display());
    println!("Terms:  {} -> {}", index.term_count(), index_path.display());
    Ok(())
}

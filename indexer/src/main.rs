use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use docsearch_core::{rank, Corpus, RankedDoc, Strategy, TrainOutcome, TrainStatus};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Train documents from disk and rank queries against them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train every file under a path and print one status line per file
    Train {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Train every file under a path, then rank a query against it
    Query {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Free-text query
        #[arg(long)]
        text: String,
        /// Ranking strategy: bm25 or tfidf
        #[arg(long, default_value_t = Strategy::Bm25)]
        strategy: Strategy,
    },
}

const READING_ERROR: &str = "error in reading the document.";

/// One line of `train` output: a corpus outcome, or a file that could not be read.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum StatusLine {
    Outcome { doc_id: i64, doc_name: String, result: &'static str },
    ReadFailure { doc_name: String, error: &'static str },
}

impl From<TrainOutcome> for StatusLine {
    fn from(outcome: TrainOutcome) -> Self {
        StatusLine::Outcome {
            doc_id: outcome.doc_id.and_then(|id| i64::try_from(id).ok()).unwrap_or(-1),
            doc_name: outcome.doc_name,
            result: outcome.status.message(),
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Train { input } => {
            let corpus = Corpus::new();
            for line in train_path(&corpus, Path::new(&input))? {
                serde_json::to_writer(&mut out, &line)?;
                out.write_all(b"\n")?;
            }
        }
        Commands::Query { input, text, strategy } => {
            if text.trim().is_empty() {
                bail!("text required.");
            }
            let corpus = Corpus::new();
            train_path(&corpus, Path::new(&input))?;
            let ranked: Vec<RankedDoc> = rank(&corpus, &text, strategy);
            serde_json::to_writer_pretty(&mut out, &ranked)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Candidate documents under `input`, sorted so doc ids follow path order.
///
/// Symlinks and entries the walk could not visit are kept; reading them later
/// decides whether they train or report an error.
fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(entry) if entry.path_is_symlink() && !entry.path().is_dir() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(err) => match err.path() {
                    Some(path) if path != input => files.push(path.to_path_buf()),
                    _ => tracing::warn!(error = %err, "error walking input"),
                },
            }
        }
    } else if input.exists() || input.is_symlink() {
        files.push(input.to_path_buf());
    }
    files.sort();
    files
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Train all files under `input` as one batch. One status line per file, in
/// path order; unreadable files get an error line instead of an outcome.
fn train_path(corpus: &Corpus, input: &Path) -> Result<Vec<StatusLine>> {
    let files = collect_files(input);
    if files.is_empty() {
        bail!("docs required: no files found under {}", input.display());
    }

    // `None` slots are filled from the corpus outcomes, in path order.
    let mut slots: Vec<Option<StatusLine>> = Vec::with_capacity(files.len());
    let mut batch: Vec<(String, Vec<u8>)> = Vec::with_capacity(files.len());
    for file in files {
        let doc_name = display_name(&file);
        match fs::read(&file) {
            Ok(content) => {
                batch.push((doc_name, content));
                slots.push(None);
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), error = %err, "error in reading the document");
                slots.push(Some(StatusLine::ReadFailure { doc_name, error: READING_ERROR }));
            }
        }
    }

    let outcomes = corpus.train(batch);
    let trained = outcomes.iter().filter(|o| o.status == TrainStatus::Trained).count();
    tracing::info!(files = slots.len(), trained, "training complete");

    let mut outcomes = outcomes.into_iter().map(StatusLine::from);
    Ok(slots.into_iter().filter_map(|slot| slot.or_else(|| outcomes.next())).collect())
}

use anyhow::{ensure, Context, Result};
use clap::Parser;
use ircore::persist::{load_stopwords, save_index};
use ircore::{Analyzer, InvertedIndex};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a BM25 inverted index from a document corpus", long_about = None)]
struct Cli {
    /// Path to the corpus root (contains documents/ and files/stopwords.txt)
    #[arg(short = 'p', long)]
    path: PathBuf,
    /// Output index file
    #[arg(long, default_value = "corpus.index")]
    output: PathBuf,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    ensure!(cli.path.exists(), "corpus path does not exist: {}", cli.path.display());

    let stopwords = load_stopwords(&cli.path.join("files").join("stopwords.txt"))?;
    let analyzer = Analyzer::english(stopwords);

    let documents = read_documents(&cli.path.join("documents"))?;
    tracing::info!(num_docs = documents.len(), "read documents");

    let normalized = documents
        .into_iter()
        .map(|(doc_id, text)| (doc_id, analyzer.normalize(&text)));
    let index = InvertedIndex::build(normalized)?;
    save_index(&cli.output, &index)?;
    Ok(())
}

/// Read every file under the documents directory as `(docID, raw text)`.
/// The docID is the path relative to the directory. Hidden files such as
/// .DS_Store are skipped; file order is sorted so repeated runs ingest
/// documents identically.
fn read_documents(dir: &Path) -> Result<Vec<(String, String)>> {
    ensure!(dir.is_dir(), "documents directory not found: {}", dir.display());
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let doc_id = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("document outside corpus root: {}", entry.path().display()))?
            .to_string_lossy()
            .into_owned();
        let text = fs::read_to_string(entry.path())
            .with_context(|| format!("failed to read document {}", entry.path().display()))?;
        documents.push((doc_id, text));
    }
    Ok(documents)
}

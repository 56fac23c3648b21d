use anyhow::{ensure, Result};
use clap::Parser;
use ircore::eval::evaluate;
use ircore::persist::{load_qrels, load_results};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evaluator")]
#[command(about = "Evaluate ranked results against relevance judgments", long_about = None)]
struct Cli {
    /// Path to the corpus root (contains files/qrels.txt)
    #[arg(short = 'p', long)]
    path: PathBuf,
    /// Results file to evaluate
    #[arg(long, default_value = "corpus.results")]
    results: PathBuf,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    ensure!(cli.path.exists(), "corpus path does not exist: {}", cli.path.display());

    let qrels = load_qrels(&cli.path.join("files").join("qrels.txt"))?;
    let results = load_results(&cli.results)?;
    tracing::info!(num_queries = qrels.len(), "evaluating");

    let report = evaluate(&qrels, &results)?;
    println!("Evaluation results:");
    println!("{report}");
    Ok(())
}

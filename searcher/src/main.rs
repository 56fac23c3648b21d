use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use ircore::persist::{load_index, load_queries, load_stopwords, save_results};
use ircore::rank::{rank, BATCH_CUTOFF, DISPLAY_CUTOFF};
use ircore::score::bm25;
use ircore::{Analyzer, InvertedIndex, RankedDoc};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Run BM25 queries against a persisted index", long_about = None)]
struct Cli {
    /// Path to the corpus root (contains files/stopwords.txt and files/queries.txt)
    #[arg(short = 'p', long)]
    path: PathBuf,
    /// Query mode
    #[arg(short = 'm', long, value_enum)]
    mode: Mode,
    /// Index file to load
    #[arg(long, default_value = "corpus.index")]
    index: PathBuf,
    /// Results file written in automatic mode
    #[arg(long, default_value = "corpus.results")]
    results: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Read queries from stdin, print the top 15 per query
    Interactive,
    /// Run the corpus query file, persist the top 40 per query
    Automatic,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    ensure!(cli.path.exists(), "corpus path does not exist: {}", cli.path.display());

    let stopwords = load_stopwords(&cli.path.join("files").join("stopwords.txt"))?;
    let analyzer = Analyzer::english(stopwords);
    let index = load_index(&cli.index)?;

    match cli.mode {
        Mode::Interactive => interactive(&analyzer, &index),
        Mode::Automatic => automatic(&cli, &analyzer, &index),
    }
}

/// Read-eval loop over stdin. `QUIT` or end of input exits.
fn interactive(analyzer: &Analyzer, index: &InvertedIndex) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "Enter a query: ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query == "QUIT" {
            break;
        }
        let terms = analyzer.normalize(query);
        let ranked = rank(bm25(&terms, index)?, DISPLAY_CUTOFF);
        writeln!(stdout, "Results for query [{query}]")?;
        for r in ranked {
            writeln!(stdout, "{} {} {}", r.rank, r.doc_id, r.score)?;
        }
    }
    Ok(())
}

/// Score every query in the corpus query file and persist the top 40 per
/// query, in query-file order.
fn automatic(cli: &Cli, analyzer: &Analyzer, index: &InvertedIndex) -> Result<()> {
    let start = Instant::now();
    let queries = load_queries(&cli.path.join("files").join("queries.txt"))?;
    tracing::info!(num_queries = queries.len(), "read queries");

    let mut results: Vec<(String, Vec<RankedDoc>)> = Vec::with_capacity(queries.len());
    for (query_id, text) in queries {
        let terms = analyzer.normalize(&text);
        let ranked = rank(bm25(&terms, index)?, BATCH_CUTOFF);
        results.push((query_id, ranked));
    }
    save_results(&cli.results, &results)?;
    tracing::info!(elapsed_s = start.elapsed().as_secs_f64(), "queries scored");
    Ok(())
}

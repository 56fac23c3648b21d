use crate::index::{DocRecord, InvertedIndex};
use crate::rank::RankedDoc;
use anyhow::{ensure, Context, Result};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

const DOC_FREQ_HEADER: &str = "Total number of documents in the collection that contain term";
const AVG_LENGTH_HEADER: &str = "The average length of a document in the corpus";
const NUM_DOCS_HEADER: &str = "Total number of documents in the collection";

/// Marker used in place of a term list for a document with no terms. A
/// document line is always written, even for zero-length documents, so the
/// corpus size survives a round trip.
const EMPTY_TERMS: &str = "None";

fn format_term_counts(counts: &HashMap<String, u32>) -> String {
    let mut entries: Vec<(&String, &u32)> = counts.iter().collect();
    // Descending count; term breaks ties so output is reproducible.
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let formatted: Vec<String> = entries.iter().map(|(t, c)| format!("{t}({c})")).collect();
    formatted.join(", ")
}

fn parse_term_counts(field: &str, line_no: usize) -> Result<HashMap<String, u32>> {
    let mut counts = HashMap::new();
    for entry in field.split(", ") {
        let (term, rest) = entry
            .split_once('(')
            .with_context(|| format!("line {line_no}: malformed term entry {entry:?}"))?;
        let count: u32 = rest
            .strip_suffix(')')
            .with_context(|| format!("line {line_no}: malformed term entry {entry:?}"))?
            .parse()
            .with_context(|| format!("line {line_no}: non-numeric count in {entry:?}"))?;
        counts.insert(term.to_string(), count);
    }
    Ok(counts)
}

/// Serialize the index to its line-oriented tab-separated layout: the
/// document-frequency header, the average-length header, the corpus-size
/// header, then one line per document. The file is written in one shot so a
/// failed run never leaves a half-written index behind.
pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    let mut out = String::new();
    writeln!(out, "{DOC_FREQ_HEADER}\t{}", format_term_counts(&index.doc_freq))?;
    writeln!(out, "{AVG_LENGTH_HEADER}\t{}", index.avg_doc_length)?;
    writeln!(out, "{NUM_DOCS_HEADER}\t{}", index.num_docs)?;

    let mut doc_ids: Vec<&String> = index.docs.keys().collect();
    doc_ids.sort();
    for doc_id in doc_ids {
        let record = &index.docs[doc_id];
        if record.term_freqs.is_empty() {
            writeln!(out, "{doc_id}\t{}\t{EMPTY_TERMS}", record.length)?;
        } else {
            writeln!(out, "{doc_id}\t{}\t{}", record.length, format_term_counts(&record.term_freqs))?;
        }
    }

    fs::write(path, out).with_context(|| format!("failed to write index file {}", path.display()))?;
    tracing::info!(path = %path.display(), "index saved");
    Ok(())
}

/// Deserialize an index file. Malformed lines are hard errors; build
/// artifacts of this pipeline are never expected to be partially corrupt.
pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    let file =
        File::open(path).with_context(|| format!("index file not found: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut doc_freq: Option<HashMap<String, u32>> = None;
    let mut avg_doc_length: Option<f64> = None;
    let mut num_docs: Option<u32> = None;
    let mut docs: HashMap<String, DocRecord> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read index line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // The corpus-size header is a prefix of the document-frequency
        // header, so the longer one must be checked first.
        if let Some(rest) = line.strip_prefix(DOC_FREQ_HEADER) {
            doc_freq = Some(parse_term_counts(rest.trim_start_matches('\t'), line_no)?);
        } else if let Some(rest) = line.strip_prefix(AVG_LENGTH_HEADER) {
            avg_doc_length = Some(
                rest.trim()
                    .parse()
                    .with_context(|| format!("line {line_no}: non-numeric average length"))?,
            );
        } else if let Some(rest) = line.strip_prefix(NUM_DOCS_HEADER) {
            num_docs = Some(
                rest.trim()
                    .parse()
                    .with_context(|| format!("line {line_no}: non-numeric corpus size"))?,
            );
        } else {
            let fields: Vec<&str> = line.split('\t').collect();
            ensure!(
                fields.len() == 3,
                "line {line_no}: expected 3 tab-separated fields, got {}",
                fields.len()
            );
            let length: u32 = fields[1]
                .parse()
                .with_context(|| format!("line {line_no}: non-numeric document length"))?;
            let term_freqs = if fields[2] == EMPTY_TERMS || fields[2].is_empty() {
                HashMap::new()
            } else {
                parse_term_counts(fields[2], line_no)?
            };
            docs.insert(fields[0].to_string(), DocRecord { length, term_freqs });
        }
    }

    let index = InvertedIndex {
        num_docs: num_docs.with_context(|| format!("{}: missing corpus size header", path.display()))?,
        avg_doc_length: avg_doc_length
            .with_context(|| format!("{}: missing average length header", path.display()))?,
        doc_freq: doc_freq
            .with_context(|| format!("{}: missing document frequency header", path.display()))?,
        docs,
    };
    tracing::info!(num_docs = index.num_docs, path = %path.display(), "index loaded");
    Ok(index)
}

/// Persist ranked results, one `queryID docID rank score` line per retrieved
/// document, in the given query order.
pub fn save_results(path: &Path, results: &[(String, Vec<RankedDoc>)]) -> Result<()> {
    let mut out = String::new();
    for (query_id, ranked) in results {
        for r in ranked {
            writeln!(out, "{query_id} {} {} {}", r.doc_id, r.rank, r.score)?;
        }
    }
    fs::write(path, out)
        .with_context(|| format!("failed to write results file {}", path.display()))?;
    tracing::info!(path = %path.display(), num_queries = results.len(), "results saved");
    Ok(())
}

/// Load a results file into per-query retrieved lists, preserving line
/// (i.e. rank) order within each query.
pub fn load_results(path: &Path) -> Result<HashMap<String, Vec<RankedDoc>>> {
    let file =
        File::open(path).with_context(|| format!("results file not found: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut results: HashMap<String, Vec<RankedDoc>> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read results line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        ensure!(fields.len() == 4, "results line {line_no}: expected 4 fields, got {}", fields.len());
        let rank: u32 = fields[2]
            .parse()
            .with_context(|| format!("results line {line_no}: non-numeric rank"))?;
        let score: f64 = fields[3]
            .parse()
            .with_context(|| format!("results line {line_no}: non-numeric score"))?;
        results
            .entry(fields[0].to_string())
            .or_default()
            .push(RankedDoc { doc_id: fields[1].to_string(), rank, score });
    }
    Ok(results)
}

/// Load relevance judgments: `queryID ignoredField docID grade` per line.
pub fn load_qrels(path: &Path) -> Result<HashMap<String, HashMap<String, i32>>> {
    let file =
        File::open(path).with_context(|| format!("qrels file not found: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut qrels: HashMap<String, HashMap<String, i32>> = HashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read qrels line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        ensure!(fields.len() == 4, "qrels line {line_no}: expected 4 fields, got {}", fields.len());
        let grade: i32 = fields[3]
            .parse()
            .with_context(|| format!("qrels line {line_no}: non-numeric relevance grade"))?;
        qrels
            .entry(fields[0].to_string())
            .or_default()
            .insert(fields[2].to_string(), grade);
    }
    Ok(qrels)
}

/// Load queries as `(queryID, raw text)` pairs in file order. Only the first
/// space separates the identifier from the text.
pub fn load_queries(path: &Path) -> Result<Vec<(String, String)>> {
    let file =
        File::open(path).with_context(|| format!("queries file not found: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut queries = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read queries line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (query_id, text) = line
            .split_once(' ')
            .with_context(|| format!("queries line {line_no}: missing query text"))?;
        queries.push((query_id.to_string(), text.to_string()));
    }
    Ok(queries)
}

/// Load a whitespace-separated stopword file.
pub fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("stopwords file not found: {}", path.display()))?;
    Ok(text.split_whitespace().map(|w| w.to_string()).collect())
}

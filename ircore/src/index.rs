use anyhow::{ensure, Result};
use std::collections::HashMap;

/// Per-document slice of the inverted index: total term count (including
/// repeats) and the in-document frequency of each distinct term. Terms
/// absent from the map have frequency 0. A zero-length document carries an
/// empty map.
#[derive(Debug, Clone, PartialEq)]
pub struct DocRecord {
    pub length: u32,
    pub term_freqs: HashMap<String, u32>,
}

/// Term-frequency inverted index over a document collection. Built once,
/// immutable afterwards; safe to share across unsynchronized readers.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedIndex {
    /// Corpus size N.
    pub num_docs: u32,
    /// Arithmetic mean of document lengths, frozen at build time.
    pub avg_doc_length: f64,
    /// term -> number of documents containing it at least once. This is
    /// document frequency, not collection frequency; BM25's idf depends on
    /// the distinction.
    pub doc_freq: HashMap<String, u32>,
    pub docs: HashMap<String, DocRecord>,
}

impl InvertedIndex {
    /// Build the index from normalized per-document term sequences.
    ///
    /// Document frequencies are folded into one owned map: each document
    /// contributes +1 per distinct term, regardless of how often the term
    /// repeats within it. An empty corpus is rejected because the average
    /// document length would be undefined.
    pub fn build(documents: impl IntoIterator<Item = (String, Vec<String>)>) -> Result<Self> {
        let mut doc_freq: HashMap<String, u32> = HashMap::new();
        let mut docs: HashMap<String, DocRecord> = HashMap::new();
        let mut total_length: u64 = 0;

        for (doc_id, terms) in documents {
            let length = terms.len() as u32;
            total_length += u64::from(length);

            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for term in terms {
                *term_freqs.entry(term).or_insert(0) += 1;
            }
            for term in term_freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            docs.insert(doc_id, DocRecord { length, term_freqs });
        }

        ensure!(!docs.is_empty(), "cannot build an index over an empty corpus");
        let num_docs = docs.len() as u32;
        let avg_doc_length = total_length as f64 / f64::from(num_docs);
        tracing::info!(num_docs, num_terms = doc_freq.len(), "index built");

        Ok(Self { num_docs, avg_doc_length, doc_freq, docs })
    }
}

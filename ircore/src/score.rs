use crate::index::InvertedIndex;
use anyhow::{ensure, Result};
use std::collections::HashMap;

/// BM25 saturation parameter.
pub const K1: f64 = 1.0;
/// BM25 length-normalization parameter.
pub const B: f64 = 0.75;

/// Score every indexed document against a query term sequence with BM25.
///
/// The outer sum iterates the query sequence, not a deduplicated set, so a
/// repeated query term contributes once per occurrence. Documents missing a
/// term take f = 0 for it. For terms with a recorded document frequency the
/// idf is `log2((N - df + 0.5) / (df + 0.5))`, which goes negative for terms
/// in more than half the corpus; that is accepted BM25 behavior. For terms
/// never seen at indexing time the fallback is `ln((N + 0.5) / 0.5)` —
/// natural log, not log2. The base mismatch is deliberate: ranking output is
/// compared against established baselines and changing either branch shifts
/// every score.
///
/// A corpus whose documents are all zero-length has an average length of 0,
/// which would turn the length normalization into 0/0; that is rejected up
/// front instead of producing NaN scores.
pub fn bm25(query_terms: &[String], index: &InvertedIndex) -> Result<HashMap<String, f64>> {
    ensure!(
        index.avg_doc_length > 0.0,
        "average document length is zero; the corpus contains no terms"
    );
    let n = f64::from(index.num_docs);
    let mut scores = HashMap::with_capacity(index.docs.len());

    for (doc_id, record) in &index.docs {
        let length = f64::from(record.length);
        let mut total = 0.0;
        for term in query_terms {
            let f = f64::from(record.term_freqs.get(term).copied().unwrap_or(0));
            let idf = match index.doc_freq.get(term) {
                Some(&df) => {
                    let df = f64::from(df);
                    ((n - df + 0.5) / (df + 0.5)).log2()
                }
                None => ((n + 0.5) / 0.5).ln(),
            };
            total += idf * (f * (K1 + 1.0))
                / (f + K1 * (1.0 - B + B * length / index.avg_doc_length));
        }
        scores.insert(doc_id.clone(), total);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InvertedIndex;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample_index() -> InvertedIndex {
        InvertedIndex::build(vec![
            ("d1".to_string(), terms(&["cat", "dog", "dog"])),
            ("d2".to_string(), terms(&["dog", "bird"])),
        ])
        .unwrap()
    }

    #[test]
    fn worked_example() {
        let index = sample_index();
        assert_eq!(index.doc_freq["dog"], 2);
        assert_eq!(index.doc_freq["cat"], 1);
        assert_eq!(index.doc_freq["bird"], 1);

        let scores = bm25(&terms(&["dog"]), &index).unwrap();
        // idf("dog") = log2(0.5 / 2.5) = log2(0.2)
        let idf = 0.2f64.log2();
        let expected_d1 = idf * (2.0 * 2.0) / (2.0 + (0.25 + 0.75 * 3.0 / 2.5));
        let expected_d2 = idf * (1.0 * 2.0) / (1.0 + (0.25 + 0.75 * 2.0 / 2.5));
        assert!((scores["d1"] - expected_d1).abs() < 1e-9);
        assert!((scores["d2"] - expected_d2).abs() < 1e-9);
        // "dog" is in every document, so its idf is negative and the
        // shorter document is hurt less.
        assert!(scores["d2"] > scores["d1"]);
    }

    #[test]
    fn every_document_is_scored() {
        let index = sample_index();
        let scores = bm25(&terms(&["cat"]), &index).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.contains_key("d2"));
    }

    #[test]
    fn unseen_term_uses_natural_log_fallback() {
        let index = sample_index();
        let scores = bm25(&terms(&["zebra"]), &index).unwrap();
        // f = 0 for every document, so each contribution is 0 regardless of
        // the fallback idf.
        assert_eq!(scores["d1"], 0.0);
        assert_eq!(scores["d2"], 0.0);
    }

    #[test]
    fn repeated_query_term_contributes_per_occurrence() {
        let index = sample_index();
        let once = bm25(&terms(&["dog"]), &index).unwrap();
        let thrice = bm25(&terms(&["dog", "dog", "dog"]), &index).unwrap();
        assert!((thrice["d1"] - 3.0 * once["d1"]).abs() < 1e-9);
    }

    #[test]
    fn score_is_monotonic_in_term_frequency() {
        // Ten equal-length documents; "p" occurs in three of them with
        // increasing frequency, so its idf is positive and only f varies.
        let mut docs = vec![
            ("a".to_string(), terms(&["p", "x", "x", "x"])),
            ("b".to_string(), terms(&["p", "p", "x", "x"])),
            ("c".to_string(), terms(&["p", "p", "p", "x"])),
        ];
        for i in 0..7 {
            docs.push((format!("filler{i}"), terms(&["x", "x", "x", "x"])));
        }
        let index = InvertedIndex::build(docs).unwrap();
        let scores = bm25(&terms(&["p"]), &index).unwrap();
        assert!(scores["c"] > scores["b"]);
        assert!(scores["b"] > scores["a"]);
        assert!(scores["a"] > scores["filler0"]);
    }

    #[test]
    fn all_zero_length_corpus_is_rejected() {
        // Average length 0 would put 0/0 in the length normalization.
        let index = InvertedIndex::build(vec![
            ("a".to_string(), vec![]),
            ("b".to_string(), vec![]),
        ])
        .unwrap();
        let err = bm25(&terms(&["dog"]), &index).unwrap_err();
        assert!(format!("{err}").contains("average document length"));
    }

    #[test]
    fn idf_sign_matches_document_frequency() {
        let mut docs: Vec<(String, Vec<String>)> = (0..100)
            .map(|i| (format!("d{i}"), terms(&["common"])))
            .collect();
        docs[0].1.push("rare".to_string());
        let index = InvertedIndex::build(docs).unwrap();

        let common = bm25(&terms(&["common"]), &index).unwrap();
        let rare = bm25(&terms(&["rare"]), &index).unwrap();
        // df("common") = N -> negative idf; df("rare") = 1, large N -> positive.
        assert!(common["d0"] < 0.0);
        assert!(rare["d0"] > 0.0);
    }
}

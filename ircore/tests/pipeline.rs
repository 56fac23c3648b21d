//! End-to-end pipeline test: normalize, build, persist, reload, score, rank.

use ircore::persist::{load_index, load_results, save_index, save_results};
use ircore::score::bm25;
use ircore::tokenizer::IdentityStemmer;
use ircore::{rank, Analyzer, InvertedIndex};
use std::collections::HashSet;
use tempfile::tempdir;

#[test]
fn index_score_rank_round_trip() {
    let analyzer = Analyzer::new(HashSet::new(), Box::new(IdentityStemmer));
    let documents = vec![
        ("d1".to_string(), analyzer.normalize("cat dog dog")),
        ("d2".to_string(), analyzer.normalize("dog bird")),
    ];
    let index = InvertedIndex::build(documents).unwrap();
    assert_eq!(index.num_docs, 2);
    assert!((index.avg_doc_length - 2.5).abs() < 1e-12);
    assert_eq!(index.doc_freq["dog"], 2);
    assert_eq!(index.doc_freq["cat"], 1);
    assert_eq!(index.doc_freq["bird"], 1);

    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.index");
    save_index(&path, &index).unwrap();
    let loaded = load_index(&path).unwrap();
    assert_eq!(loaded, index);

    let query = analyzer.normalize("dog");
    let scores = bm25(&query, &loaded).unwrap();
    // "dog" appears in every document, so both scores are negative; the
    // shorter document is penalized less and ranks first.
    assert!((scores["d1"] - -2.948).abs() < 1e-3);
    assert!((scores["d2"] - -2.511).abs() < 1e-3);

    let ranked = rank::rank(scores, rank::BATCH_CUTOFF);
    assert_eq!(ranked[0].doc_id, "d2");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].doc_id, "d1");
    assert_eq!(ranked[1].rank, 2);

    let results_path = dir.path().join("corpus.results");
    save_results(&results_path, &[("q1".to_string(), ranked.clone())]).unwrap();
    let reloaded = load_results(&results_path).unwrap();
    assert_eq!(reloaded["q1"], ranked);
}

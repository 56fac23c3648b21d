use std::cmp::Ordering;
use std::collections::HashMap;

/// Interactive display cutoff.
pub const DISPLAY_CUTOFF: usize = 15;
/// Batch-mode persistence cutoff. Larger than the display cutoff so that
/// metrics scanning the full retrieved list (Recall, MAP, bpref) see more
/// than the top-15 window.
pub const BATCH_CUTOFF: usize = 40;

/// One retrieved document with its 1-based rank and BM25 score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedDoc {
    pub doc_id: String,
    pub rank: u32,
    pub score: f64,
}

/// Sort scored documents by descending score, truncate to `cutoff`, and
/// assign 1-based ranks. Ties are broken by ascending document ID so the
/// ranking is deterministic across runs.
pub fn rank(scores: HashMap<String, f64>, cutoff: usize) -> Vec<RankedDoc> {
    let mut scored: Vec<(String, f64)> = scores.into_iter().collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(cutoff);
    scored
        .into_iter()
        .enumerate()
        .map(|(i, (doc_id, score))| RankedDoc { doc_id, rank: (i + 1) as u32, score })
        .collect()
}

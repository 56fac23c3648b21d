use crate::rank::RankedDoc;
use anyhow::{ensure, Context, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Rank cutoff shared by P@15 and NDCG@15.
pub const EVAL_CUTOFF: usize = 15;

/// Corpus-mean retrieval effectiveness metrics. Each field is the arithmetic
/// mean of the per-query value over every query in the qrels.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub precision: f64,
    pub recall: f64,
    pub r_precision: f64,
    pub precision_at_15: f64,
    pub ndcg_at_15: f64,
    pub map: f64,
    pub bpref: f64,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Precision:   {:.3}", self.precision)?;
        writeln!(f, "Recall:      {:.3}", self.recall)?;
        writeln!(f, "R-Precision: {:.3}", self.r_precision)?;
        writeln!(f, "P@15:        {:.3}", self.precision_at_15)?;
        writeln!(f, "NDCG@15:     {:.3}", self.ndcg_at_15)?;
        writeln!(f, "MAP:         {:.3}", self.map)?;
        write!(f, "bpref:       {:.3}", self.bpref)
    }
}

#[derive(Debug)]
struct QueryMetrics {
    precision: f64,
    recall: f64,
    r_precision: f64,
    precision_at_15: f64,
    ndcg_at_15: f64,
    average_precision: f64,
    bpref: f64,
}

/// Average precision over the full retrieved list: at each rank holding a
/// relevant document, take relevant-seen-so-far / rank, then divide the sum
/// by |rel|. Caller guarantees `rel` is non-empty.
fn average_precision(ret: &[&str], rel: &HashSet<&str>) -> f64 {
    let mut hits = 0u32;
    let mut sum = 0.0;
    for (i, doc_id) in ret.iter().enumerate() {
        if rel.contains(doc_id) {
            hits += 1;
            sum += f64::from(hits) / (i + 1) as f64;
        }
    }
    sum / rel.len() as f64
}

/// NDCG at `k` over graded judgments. The DCG increment at position i is the
/// grade for i = 0 and grade / log2(i + 1) afterwards; the ideal DCG uses
/// the judged grades sorted descending, padded with zeros. Caller guarantees
/// at least `k` retrieved documents. A query whose judged grades are all
/// zero has a zero ideal DCG, leaving the ratio undefined; that aborts the
/// evaluation rather than feeding NaN into the aggregate mean.
fn ndcg_at(ret: &[&str], judged: &HashMap<String, i32>, k: usize) -> Result<f64> {
    let mut ideal_grades: Vec<i32> = judged.values().copied().collect();
    ideal_grades.sort_unstable_by(|a, b| b.cmp(a));

    let mut dcg = 0.0;
    let mut idcg = 0.0;
    for i in 0..k {
        let grade = f64::from(judged.get(ret[i]).copied().unwrap_or(0));
        let ideal = f64::from(ideal_grades.get(i).copied().unwrap_or(0));
        if i == 0 {
            dcg = grade;
            idcg = ideal;
        } else {
            let discount = ((i + 1) as f64).log2();
            dcg += grade / discount;
            idcg += ideal / discount;
        }
    }
    ensure!(idcg != 0.0, "ideal DCG@{k} is zero; no positive relevance grades");
    Ok(dcg / idcg)
}

/// Binary preference. Walks the retrieved list, stopping once as many
/// non-relevant documents have been seen as there are relevant ones; each
/// relevant document before that point contributes 1 - nonrel_seen / R.
/// Unlike the other metrics this one guards R = 0 with a zero result.
fn bpref(ret: &[&str], rel: &HashSet<&str>) -> f64 {
    let r = rel.len();
    if r == 0 {
        return 0.0;
    }
    let mut nonrel_seen = 0usize;
    let mut sum = 0.0;
    for doc_id in ret {
        if nonrel_seen >= r {
            break;
        }
        if rel.contains(doc_id) {
            sum += 1.0 - nonrel_seen as f64 / r as f64;
        } else {
            nonrel_seen += 1;
        }
    }
    sum / r as f64
}

fn query_metrics(
    query_id: &str,
    judged: &HashMap<String, i32>,
    retrieved: &[RankedDoc],
) -> Result<QueryMetrics> {
    // A judged document counts as relevant for the set-membership metrics
    // regardless of its grade; only NDCG weighs the grade itself.
    let rel: HashSet<&str> = judged.keys().map(|s| s.as_str()).collect();
    let ret: Vec<&str> = retrieved.iter().map(|r| r.doc_id.as_str()).collect();

    ensure!(!ret.is_empty(), "query {query_id}: no retrieved documents");
    ensure!(!rel.is_empty(), "query {query_id}: no judged documents");
    ensure!(
        ret.len() >= EVAL_CUTOFF,
        "query {query_id}: NDCG@{EVAL_CUTOFF} needs at least {EVAL_CUTOFF} retrieved documents, got {}",
        ret.len()
    );

    let relret = ret.iter().filter(|d| rel.contains(*d)).count();
    let rel_in_top_15 = ret.iter().take(EVAL_CUTOFF).filter(|d| rel.contains(*d)).count();
    let rel_in_top_r = ret.iter().take(rel.len()).filter(|d| rel.contains(*d)).count();

    Ok(QueryMetrics {
        precision: relret as f64 / ret.len() as f64,
        recall: relret as f64 / rel.len() as f64,
        r_precision: rel_in_top_r as f64 / rel.len() as f64,
        precision_at_15: rel_in_top_15 as f64 / EVAL_CUTOFF as f64,
        ndcg_at_15: ndcg_at(&ret, judged, EVAL_CUTOFF)
            .with_context(|| format!("query {query_id}: NDCG@{EVAL_CUTOFF} undefined"))?,
        average_precision: average_precision(&ret, &rel),
        bpref: bpref(&ret, &rel),
    })
}

/// Evaluate ranked results against relevance judgments. Only queries present
/// in the qrels are evaluated; a judged query missing from the results is a
/// pipeline inconsistency and aborts the evaluation rather than skewing the
/// mean.
pub fn evaluate(
    qrels: &HashMap<String, HashMap<String, i32>>,
    results: &HashMap<String, Vec<RankedDoc>>,
) -> Result<EvaluationReport> {
    ensure!(!qrels.is_empty(), "qrels contain no queries");

    let mut sums = EvaluationReport {
        precision: 0.0,
        recall: 0.0,
        r_precision: 0.0,
        precision_at_15: 0.0,
        ndcg_at_15: 0.0,
        map: 0.0,
        bpref: 0.0,
    };
    for (query_id, judged) in qrels {
        let retrieved = results
            .get(query_id)
            .with_context(|| format!("query {query_id} judged in qrels but missing from results"))?;
        let m = query_metrics(query_id, judged, retrieved)?;
        sums.precision += m.precision;
        sums.recall += m.recall;
        sums.r_precision += m.r_precision;
        sums.precision_at_15 += m.precision_at_15;
        sums.ndcg_at_15 += m.ndcg_at_15;
        sums.map += m.average_precision;
        sums.bpref += m.bpref;
    }

    let n = qrels.len() as f64;
    Ok(EvaluationReport {
        precision: sums.precision / n,
        recall: sums.recall / n,
        r_precision: sums.r_precision / n,
        precision_at_15: sums.precision_at_15 / n,
        ndcg_at_15: sums.ndcg_at_15 / n,
        map: sums.map / n,
        bpref: sums.bpref / n,
    })
}

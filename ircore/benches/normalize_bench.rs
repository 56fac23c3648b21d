use criterion::{criterion_group, criterion_main, Criterion};
use ircore::Analyzer;
use std::collections::HashSet;

const SAMPLE: &str = "Experimental investigation of the aerodynamics of a \
wing in a slipstream [figure-1.gif]. An experimental study of a wing in a \
propeller slipstream was made in order to determine the spanwise \
distribution of the lift increase due to slipstream at different angles of \
attack of the wing and at different free-stream to slipstream velocity \
ratios. The results were intended in part as an evaluation basis for \
different theoretical treatments of this problem.";

fn bench_normalize(c: &mut Criterion) {
    let stopwords: HashSet<String> =
        ["a", "an", "and", "at", "in", "of", "the", "this", "to", "was", "were"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    let analyzer = Analyzer::english(stopwords);
    c.bench_function("normalize_abstract", |b| b.iter(|| analyzer.normalize(SAMPLE)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);

pub mod eval;
pub mod index;
pub mod persist;
pub mod rank;
pub mod score;
pub mod tokenizer;

pub use eval::EvaluationReport;
pub use index::{DocRecord, InvertedIndex};
pub use rank::RankedDoc;
pub use tokenizer::Analyzer;

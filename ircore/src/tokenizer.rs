use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;

lazy_static! {
    // Bracketed image references like [fig3.gif] carry no ranking signal.
    // Applied after lowercasing, so the extension alternation needs no
    // case-insensitive flag.
    static ref IMAGE_REF: Regex = Regex::new(r"\[.*\.(gif|png|jpg)\]").expect("valid regex");
}

/// Token-to-token stemming capability. Kept behind a trait so indexing and
/// scoring can be tested with an identity stemmer, independent of the
/// linguistic algorithm.
pub trait Stem: Send + Sync {
    fn stem(&self, token: &str) -> String;
}

/// Snowball English stemmer from `rust-stemmers`.
pub struct EnglishStemmer {
    inner: Stemmer,
}

impl Default for EnglishStemmer {
    fn default() -> Self {
        Self { inner: Stemmer::create(Algorithm::English) }
    }
}

impl Stem for EnglishStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).to_string()
    }
}

/// Passes tokens through unchanged.
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    fn stem(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Turns raw text into normalized term sequences. The same analyzer is used
/// for documents and queries so both sides of the match see identical terms.
pub struct Analyzer {
    stopwords: HashSet<String>,
    stemmer: Box<dyn Stem>,
}

impl Analyzer {
    pub fn new(stopwords: HashSet<String>, stemmer: Box<dyn Stem>) -> Self {
        Self { stopwords, stemmer }
    }

    /// Analyzer with the English stemmer, the production configuration.
    pub fn english(stopwords: HashSet<String>) -> Self {
        Self::new(stopwords, Box::new(EnglishStemmer::default()))
    }

    /// Normalize text into terms: lowercase, strip image-reference markers,
    /// replace hyphens with spaces (compound words match their parts),
    /// delete remaining ASCII punctuation, split on whitespace, drop
    /// stopwords, stem. Order and duplicates are preserved; frequency
    /// counting happens at index build time.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = IMAGE_REF.replace_all(&lowered, " ");
        let mut cleaned = String::with_capacity(stripped.len());
        for c in stripped.chars() {
            if c == '-' {
                cleaned.push(' ');
            } else if !c.is_ascii_punctuation() {
                cleaned.push(c);
            }
        }
        cleaned
            .split_whitespace()
            .filter(|token| !self.stopwords.contains(*token))
            .map(|token| self.stemmer.stem(token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(stopwords: &[&str]) -> Analyzer {
        let set = stopwords.iter().map(|s| s.to_string()).collect();
        Analyzer::new(set, Box::new(IdentityStemmer))
    }

    #[test]
    fn lowercases_and_splits() {
        let a = identity(&[]);
        assert_eq!(a.normalize("Cat DOG"), vec!["cat", "dog"]);
    }

    #[test]
    fn strips_image_references() {
        let a = identity(&[]);
        assert_eq!(a.normalize("see [diagram.gif] here"), vec!["see", "here"]);
        assert_eq!(a.normalize("[photo.JPG]"), Vec::<String>::new());
    }

    #[test]
    fn hyphens_become_spaces() {
        let a = identity(&[]);
        assert_eq!(a.normalize("state-of-the-art"), vec!["state", "of", "the", "art"]);
    }

    #[test]
    fn punctuation_is_deleted_without_replacement() {
        let a = identity(&[]);
        assert_eq!(a.normalize("don't stop, now!"), vec!["dont", "stop", "now"]);
    }

    #[test]
    fn stopwords_removed_after_lowercasing() {
        let a = identity(&["the"]);
        assert_eq!(a.normalize("The cat THE dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn duplicates_and_order_preserved() {
        let a = identity(&[]);
        assert_eq!(a.normalize("dog cat dog"), vec!["dog", "cat", "dog"]);
    }

    #[test]
    fn empty_text_yields_empty_sequence() {
        let a = identity(&[]);
        assert!(a.normalize("").is_empty());
        assert!(a.normalize("  \t\n ").is_empty());
    }

    #[test]
    fn english_stemmer_stems() {
        let a = Analyzer::english(HashSet::new());
        assert_eq!(a.normalize("running runners"), vec!["run", "runner"]);
    }
}

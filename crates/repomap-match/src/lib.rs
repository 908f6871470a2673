//! Identifier matchers: fuzzy, curated-domain, adaptive TF-IDF,
//! embedding, and their weighted fusion.

pub mod domain;
pub mod embedding;
pub mod fuzzy;
pub mod hybrid;
pub mod tfidf;
pub mod tokenize;

pub use domain::DomainSemanticMatcher;
pub use embedding::{EmbeddingMatcher, EmbeddingProvider, HashingEmbeddingProvider};
pub use fuzzy::FuzzyMatcher;
pub use hybrid::HybridMatcher;
pub use tfidf::AdaptiveSemanticMatcher;

use repomap_core::types::Match;

/// Common contract every matcher in this crate implements: score and
/// sort a corpus against one query string.
pub trait Matcher: Send + Sync {
    fn match_query(&self, query: &str, corpus: &[String]) -> Vec<Match>;
}

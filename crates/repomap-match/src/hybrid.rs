//! Weighted fusion of the fuzzy, TF-IDF, domain, and embedding matchers.
//! `fuzzy` and `tfidf` are always present; `domain` and `embedding` are
//! optional, and the weight table changes depending on which of the
//! optional two are actually used for a given query.

use crate::domain::DomainSemanticMatcher;
use crate::embedding::EmbeddingMatcher;
use crate::fuzzy::FuzzyMatcher;
use crate::tfidf::AdaptiveSemanticMatcher;
use crate::tokenize::tokenize;
use crate::Matcher;
use repomap_core::types::{sort_matches, Match};

pub const DEFAULT_THRESHOLD: u32 = 50;

struct Weights {
    fuzzy: f64,
    tfidf: f64,
    domain: f64,
    embedding: f64,
}

/// Selects the weight row of the matcher-availability table. `fuzzy`
/// and `tfidf` are mandatory; this only branches on `domain`/`embedding`.
fn weights_for(domain: bool, embedding: bool) -> Weights {
    match (domain, embedding) {
        (true, true) => Weights { fuzzy: 0.25, tfidf: 0.20, domain: 0.30, embedding: 0.25 },
        (true, false) => Weights { fuzzy: 0.40, tfidf: 0.30, domain: 0.30, embedding: 0.0 },
        (false, true) => Weights { fuzzy: 0.35, tfidf: 0.25, domain: 0.0, embedding: 0.40 },
        (false, false) => Weights { fuzzy: 0.60, tfidf: 0.40, domain: 0.0, embedding: 0.0 },
    }
}

pub struct HybridMatcher {
    fuzzy: FuzzyMatcher,
    tfidf: AdaptiveSemanticMatcher,
    domain: Option<DomainSemanticMatcher>,
    embedding: Option<EmbeddingMatcher>,
    threshold: u32,
}

impl HybridMatcher {
    pub fn new(
        fuzzy: FuzzyMatcher,
        tfidf: AdaptiveSemanticMatcher,
        domain: Option<DomainSemanticMatcher>,
        embedding: Option<EmbeddingMatcher>,
        threshold: u32,
    ) -> Self {
        Self {
            fuzzy,
            tfidf,
            domain,
            embedding,
            threshold: threshold.min(100),
        }
    }

    /// Builds the TF-IDF model over the corpus; call before matching.
    pub fn learn(&self, corpus: &[String]) {
        self.tfidf.learn(corpus);
    }

    fn combined_score(&self, query: &str, candidate: &str, skip_embedding: bool) -> f64 {
        let fuzzy_score = self.fuzzy.similarity(query, candidate);
        let tfidf_score = self.tfidf.similarity(query, candidate);
        let domain_score = self.domain.as_ref().map(|d| d.similarity(query, candidate));
        let embedding_score = if skip_embedding {
            None
        } else {
            self.embedding.as_ref().map(|e| e.similarity(query, candidate))
        };

        let weights = weights_for(domain_score.is_some(), embedding_score.is_some());
        weights.fuzzy * fuzzy_score
            + weights.tfidf * tfidf_score
            + weights.domain * domain_score.unwrap_or(0.0)
            + weights.embedding * embedding_score.unwrap_or(0.0)
    }
}

impl Matcher for HybridMatcher {
    fn match_query(&self, query: &str, corpus: &[String]) -> Vec<Match> {
        // Embedding inference is the most expensive step; a single-token
        // query is cheap enough for fuzzy/TF-IDF/domain alone to resolve.
        let skip_embedding = tokenize(query).len() <= 1;

        let mut matches: Vec<Match> = corpus
            .iter()
            .map(|candidate| Match::new(candidate.clone(), self.combined_score(query, candidate, skip_embedding)))
            .filter(|m| m.score >= self.threshold)
            .collect();
        sort_matches(&mut matches);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbeddingProvider;

    fn corpus() -> Vec<String> {
        vec!["get_user".to_string(), "set_user".to_string(), "delete_post".to_string(), "authenticate_user".to_string()]
    }

    #[test]
    fn fuzzy_and_tfidf_only_ranks_exact_match_first() {
        let matcher = HybridMatcher::new(FuzzyMatcher::default(), AdaptiveSemanticMatcher::new(), None, None, DEFAULT_THRESHOLD);
        matcher.learn(&corpus());
        let matches = matcher.match_query("get_user", &corpus());
        assert_eq!(matches[0].identifier, "get_user");
        assert_eq!(matches[0].score, 100);
    }

    #[test]
    fn all_four_matchers_combine() {
        let matcher = HybridMatcher::new(
            FuzzyMatcher::default(),
            AdaptiveSemanticMatcher::new(),
            Some(DomainSemanticMatcher::new()),
            Some(EmbeddingMatcher::new(Box::new(HashingEmbeddingProvider::default()), None)),
            0,
        );
        matcher.learn(&corpus());
        let matches = matcher.match_query("authenticate user", &corpus());
        assert!(matches.iter().any(|m| m.identifier == "authenticate_user"));
    }

    #[test]
    fn below_threshold_dropped() {
        let matcher = HybridMatcher::new(FuzzyMatcher::default(), AdaptiveSemanticMatcher::new(), None, None, 99);
        matcher.learn(&corpus());
        let matches = matcher.match_query("get_user", &vec!["zzz_totally_unrelated".to_string()]);
        assert!(matches.is_empty());
    }
}

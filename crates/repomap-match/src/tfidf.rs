//! TF-IDF cosine similarity matcher. `learn` builds the document-
//! frequency table over the full corpus once; queries and candidates
//! are then scored against it. Word scores get TF=1 — identifiers are
//! short, so term frequency beyond presence doesn't carry much signal.

use crate::tokenize::tokenize;
use crate::Matcher;
use parking_lot::RwLock;
use repomap_core::types::{sort_matches, Match};
use std::collections::HashMap;

#[derive(Default)]
struct Model {
    corpus_size: usize,
    document_frequency: HashMap<String, usize>,
}

impl Model {
    fn idf(&self, word: &str) -> f64 {
        let df = self.document_frequency.get(word).copied().unwrap_or(0);
        if df == 0 || self.corpus_size == 0 {
            return 0.0;
        }
        (self.corpus_size as f64 / df as f64).ln()
    }

    fn vector(&self, words: &[String]) -> HashMap<String, f64> {
        words.iter().map(|w| (w.clone(), self.idf(w))).collect()
    }
}

pub struct AdaptiveSemanticMatcher {
    model: RwLock<Model>,
    cache: RwLock<HashMap<(String, String), f64>>,
}

impl AdaptiveSemanticMatcher {
    pub fn new() -> Self {
        Self {
            model: RwLock::new(Model::default()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Build the document-frequency table over `corpus`. Each
    /// identifier is one "document"; a word's DF is the number of
    /// identifiers it appears in (not total occurrence count).
    pub fn learn(&self, corpus: &[String]) {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for identifier in corpus {
            let words: std::collections::HashSet<String> = tokenize(identifier).into_iter().collect();
            for word in words {
                *document_frequency.entry(word).or_insert(0) += 1;
            }
        }
        let mut model = self.model.write();
        model.corpus_size = corpus.len();
        model.document_frequency = document_frequency;
        self.cache.write().clear();
    }

    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let key = (query.to_string(), candidate.to_string());
        if let Some(cached) = self.cache.read().get(&key) {
            return *cached;
        }

        let model = self.model.read();
        let query_words = tokenize(query);
        let candidate_words = tokenize(candidate);
        let query_vec = model.vector(&query_words);
        let candidate_vec = model.vector(&candidate_words);
        drop(model);

        let score = cosine(&query_vec, &candidate_vec);
        self.cache.write().insert(key, score);
        score
    }
}

impl Default for AdaptiveSemanticMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let mut dot = 0.0;
    for (word, a_weight) in a {
        if let Some(b_weight) = b.get(word) {
            dot += a_weight * b_weight;
        }
    }
    let norm_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

impl Matcher for AdaptiveSemanticMatcher {
    fn match_query(&self, query: &str, corpus: &[String]) -> Vec<Match> {
        let mut matches: Vec<Match> = corpus
            .iter()
            .map(|candidate| Match::new(candidate.clone(), self.similarity(query, candidate)))
            .filter(|m| m.score > 0)
            .collect();
        sort_matches(&mut matches);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_identifier_scores_one() {
        let matcher = AdaptiveSemanticMatcher::new();
        let corpus = vec!["get_user".to_string(), "set_user".to_string(), "delete_post".to_string()];
        matcher.learn(&corpus);
        assert!((matcher.similarity("get_user", "get_user") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shared_rare_word_outranks_common_word() {
        let matcher = AdaptiveSemanticMatcher::new();
        let corpus = vec![
            "get_user".to_string(),
            "set_user".to_string(),
            "delete_user".to_string(),
            "get_post".to_string(),
        ];
        matcher.learn(&corpus);
        let rare = matcher.similarity("get_post", "set_post");
        let common = matcher.similarity("get_post", "get_user");
        assert!(rare > common, "rare word overlap ({rare}) should outrank common word overlap ({common})");
    }

    #[test]
    fn cache_is_cleared_on_relearn() {
        let matcher = AdaptiveSemanticMatcher::new();
        matcher.learn(&["get_user".to_string()]);
        let _ = matcher.similarity("get_user", "get_user");
        matcher.learn(&["set_post".to_string(), "get_post".to_string()]);
        assert!(matcher.cache.read().is_empty());
    }
}

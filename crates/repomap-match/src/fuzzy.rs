//! Token-aware fuzzy matcher: normalizes identifiers via [`tokenize`]
//! before scoring with Jaro-Winkler similarity.

use crate::tokenize::normalized;
use crate::Matcher;
use repomap_core::types::{sort_matches, Match};

pub const DEFAULT_THRESHOLD: u32 = 70;

pub struct FuzzyMatcher {
    threshold: u32,
}

impl FuzzyMatcher {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        strsim::jaro_winkler(&normalized(query), &normalized(candidate))
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl Matcher for FuzzyMatcher {
    fn match_query(&self, query: &str, corpus: &[String]) -> Vec<Match> {
        let mut matches: Vec<Match> = corpus
            .iter()
            .map(|candidate| Match::new(candidate.clone(), self.similarity(query, candidate)))
            .filter(|m| m.score >= self.threshold)
            .collect();
        sort_matches(&mut matches);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_scores_100() {
        let matcher = FuzzyMatcher::default();
        let matches = matcher.match_query("getUser", &vec!["getUser".to_string(), "setUser".to_string()]);
        assert_eq!(matches[0].identifier, "getUser");
        assert_eq!(matches[0].score, 100);
    }

    #[test]
    fn below_threshold_is_dropped() {
        let matcher = FuzzyMatcher::new(95);
        let matches = matcher.match_query("getUser", &vec!["completelyDifferentName".to_string()]);
        assert!(matches.is_empty());
    }

    #[test]
    fn case_and_separator_insensitive() {
        let matcher = FuzzyMatcher::default();
        let score = matcher.similarity("get_user_id", "getUserId");
        assert!(score > 0.99);
    }
}

//! Curated-dictionary semantic matcher: similarity is the Jaccard index
//! of the concept buckets a query and a candidate's words fall into,
//! boosted when the bucket sets are identical.

use crate::tokenize::tokenize;
use crate::Matcher;
use repomap_core::types::{sort_matches, Match};
use std::collections::HashSet;

const BUCKET_BOOST: f64 = 0.3;

/// `(bucket name, member words)`. Ordering doesn't matter; every word
/// is looked up by membership, not position.
const BUCKETS: &[(&str, &[&str])] = &[
    ("authentication", &["auth", "authenticate", "authorize", "login", "logout", "password", "token", "session", "credential", "oauth", "jwt", "permission", "role"]),
    ("data_processing", &["process", "transform", "parse", "convert", "map", "reduce", "filter", "aggregate", "pipeline", "batch"]),
    ("configuration", &["config", "settings", "options", "preferences", "env", "environment", "setup", "init", "initialize"]),
    ("api_development", &["api", "endpoint", "route", "handler", "controller", "request", "response", "rest", "graphql", "rpc"]),
    ("database", &["db", "database", "query", "sql", "table", "schema", "migration", "model", "orm", "transaction", "connection"]),
    ("testing", &["test", "spec", "mock", "stub", "fixture", "assert", "expect", "suite", "coverage"]),
    ("file_operations", &["file", "read", "write", "open", "close", "path", "directory", "dir", "load", "save", "stream"]),
    ("network", &["http", "socket", "tcp", "udp", "url", "uri", "client", "server", "fetch", "download", "upload"]),
    ("logging", &["log", "logger", "logging", "trace", "debug", "warn", "error", "info", "audit"]),
    ("caching", &["cache", "memoize", "evict", "ttl", "invalidate", "lru"]),
    ("validation", &["validate", "validator", "check", "verify", "sanitize", "schema", "constraint"]),
    ("error_handling", &["error", "exception", "fail", "failure", "panic", "recover", "retry", "fallback"]),
    ("security", &["security", "encrypt", "decrypt", "hash", "sign", "cipher", "secure", "sanitize", "csrf", "xss"]),
    ("performance", &["performance", "perf", "optimize", "benchmark", "profile", "latency", "throughput", "speed"]),
];

fn buckets_for(words: &[String]) -> HashSet<&'static str> {
    let mut found = HashSet::new();
    for word in words {
        for (bucket, members) in BUCKETS {
            if members.contains(&word.as_str()) {
                found.insert(*bucket);
            }
        }
    }
    found
}

fn jaccard(a: &HashSet<&'static str>, b: &HashSet<&'static str>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

pub struct DomainSemanticMatcher;

impl DomainSemanticMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let query_buckets = buckets_for(&tokenize(query));
        let candidate_buckets = buckets_for(&tokenize(candidate));
        let mut score = jaccard(&query_buckets, &candidate_buckets);
        if !query_buckets.is_empty() && query_buckets == candidate_buckets {
            score += BUCKET_BOOST;
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for DomainSemanticMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for DomainSemanticMatcher {
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
    fn same_bucket_scores_high() {
        let matcher = DomainSemanticMatcher::new();
        let score = matcher.similarity("authenticate_user", "user_auth");
        assert!(score > 0.5);
    }

    #[test]
    fn unrelated_buckets_score_low() {
        let matcher = DomainSemanticMatcher::new();
        let score = matcher.similarity("authenticate_user", "read_file");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn exact_bucket_set_gets_boosted() {
        let matcher = DomainSemanticMatcher::new();
        let score = matcher.similarity("login", "logout");
        assert!(score > 0.9);
    }
}

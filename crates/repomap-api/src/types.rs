//! Value types for the six project-level operations.

use repomap_core::Language;
use repomap_parser::CacheStats;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Fuzzy,
    Semantic,
    Hybrid,
}

/// Result of [`crate::RepomapEngine::analyze_project`].
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub file_count: usize,
    pub identifier_count: usize,
    pub language_distribution: HashMap<Language, usize>,
    pub cache_stats: Option<CacheStats>,
    pub failures: Vec<(PathBuf, String)>,
}

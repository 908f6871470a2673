//! [`RepomapEngine`]: wires tag extraction, the dependency graph,
//! matchers, and LLM summaries into the six project-level operations
//! that form the core's external interface. The outer CLI, config
//! loading, and console rendering are deliberately not here — a caller
//! constructs a [`RepomapConfig`] and hands it to [`RepomapEngine::new`].

use crate::types::{MatchType, ProjectInfo};
use rayon::prelude::*;
use repomap_core::config::RepomapConfig;
use repomap_core::error::Result;
use repomap_core::types::Match;
use repomap_graph::{
    build_call_graph, AdvancedDependencyGraph, CentralityCalculator, DependencyGraph, FileAnalysis, FileAnalyzer, ProjectImports,
};
use repomap_llm::{LLMAnalyzer, Layout, SelectionStrategy};
use repomap_match::{AdaptiveSemanticMatcher, DomainSemanticMatcher, FuzzyMatcher, HybridMatcher, Matcher};
use repomap_parser::{FileDiscovery, TagCache, TreeSitterParser};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// File count above which [`RepomapEngine::analyze_all_files`] spreads
/// parsing/import-resolution across a worker pool instead of running
/// sequentially, matching the threshold `build_call_graph` uses for the
/// same tradeoff.
const ANALYSIS_PARALLEL_THRESHOLD: usize = 10;

pub struct RepomapEngine {
    config: RepomapConfig,
    project_root: PathBuf,
    discovery: FileDiscovery,
    parser: TreeSitterParser,
    cache: Option<Arc<TagCache>>,
}

impl RepomapEngine {
    pub fn new(config: RepomapConfig) -> Result<Self> {
        let project_root = config.project_root.canonicalize().unwrap_or_else(|_| config.project_root.clone());

        let cache = if RepomapConfig::cache_enabled() {
            let path = Self::cache_path(&project_root);
            Some(Arc::new(TagCache::open(&path)?))
        } else {
            None
        };

        Ok(Self {
            discovery: FileDiscovery::new(project_root.as_path()),
            parser: TreeSitterParser::new(cache.clone()),
            cache,
            project_root,
            config,
        })
    }

    /// One cache file per project, namespaced by a hash of its
    /// canonical root, under the default cache directory.
    fn cache_path(project_root: &Path) -> PathBuf {
        let hash = Sha256::digest(project_root.to_string_lossy().as_bytes());
        let namespace = hash.iter().take(8).map(|b| format!("{b:02x}")).collect::<String>();
        RepomapConfig::default_cache_dir().join(namespace).join("tags.sqlite3")
    }

    fn analyzable_files(&self) -> Vec<PathBuf> {
        self.discovery.analyzable_files(false)
    }

    /// Per-file tags, imports, and calls for every analyzable file,
    /// sorted by path so downstream graph construction is deterministic.
    /// Above [`ANALYSIS_PARALLEL_THRESHOLD`] files, parsing and import
    /// resolution run on a worker pool sized by
    /// `config.performance.max_workers`; a per-file failure (the file
    /// vanished between discovery and analysis) is recorded rather than
    /// aborting the batch.
    fn analyze_all_files(&self) -> (Vec<FileAnalysis>, Vec<(PathBuf, String)>) {
        let files = self.analyzable_files();
        let project_files: HashSet<PathBuf> = files.iter().cloned().collect();
        let analyzer = FileAnalyzer::new(&self.parser, self.project_root.as_path());

        let results: Vec<(PathBuf, std::result::Result<FileAnalysis, String>)> = if files.len() > ANALYSIS_PARALLEL_THRESHOLD {
            match rayon::ThreadPoolBuilder::new().num_threads(self.config.performance.max_workers).build() {
                Ok(pool) => pool.install(|| {
                    files.par_iter().map(|file| (file.clone(), analyzer.analyze(file, &project_files))).collect()
                }),
                Err(e) => {
                    warn!(error = %e, "failed to build analysis worker pool, falling back to sequential");
                    files.iter().map(|file| (file.clone(), analyzer.analyze(file, &project_files))).collect()
                }
            }
        } else {
            files.iter().map(|file| (file.clone(), analyzer.analyze(file, &project_files))).collect()
        };

        let mut analyses = Vec::new();
        let mut failures = Vec::new();
        for (file, result) in results {
            match result {
                Ok(analysis) => analyses.push(analysis),
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "file analysis failed");
                    failures.push((file, e));
                }
            }
        }
        analyses.sort_by(|a, b| a.file.cmp(&b.file));
        (analyses, failures)
    }

    fn build_advanced_graph(&self, analyses: &[FileAnalysis]) -> AdvancedDependencyGraph {
        let project_imports = ProjectImports {
            per_file: analyses.iter().map(|a| (a.file.clone(), a.language.clone(), a.imports.clone())).collect(),
        };
        let graph = DependencyGraph::build(&project_imports);

        let call_graph = if self.config.dependencies.enable_call_graph {
            let file_tags: Vec<(PathBuf, Vec<_>)> = analyses.iter().map(|a| (a.file.clone(), a.tags.clone())).collect();
            build_call_graph(&file_tags).0
        } else {
            Default::default()
        };

        AdvancedDependencyGraph::new(graph, call_graph)
    }

    /// Counts files and identifiers, tallies the language distribution,
    /// and reports cache stats when the cache is enabled. Files that
    /// failed analysis are listed in `failures` rather than silently
    /// dropped from the count.
    pub fn analyze_project(&self) -> Result<ProjectInfo> {
        let (analyses, failures) = self.analyze_all_files();
        let mut language_distribution: HashMap<repomap_core::Language, usize> = HashMap::new();
        let mut identifier_count = 0;
        for analysis in &analyses {
            if let Some(language) = &analysis.language {
                *language_distribution.entry(language.clone()).or_insert(0) += 1;
            }
            identifier_count += analysis.tags.len();
        }

        let cache_stats = match &self.cache {
            Some(cache) => Some(cache.stats()?),
            None => None,
        };

        Ok(ProjectInfo {
            file_count: analyses.len(),
            identifier_count,
            language_distribution,
            cache_stats,
            failures,
        })
    }

    /// Ranks identifiers against `query` using the requested matcher.
    /// `threshold` is a score in `[0, 100]`; `target_files` restricts
    /// the identifier corpus to those files when present.
    pub fn search_identifiers(
        &self,
        query: &str,
        match_type: MatchType,
        threshold: u32,
        max_results: usize,
        target_files: Option<&[PathBuf]>,
    ) -> Result<Vec<Match>> {
        let (analyses, _failures) = self.analyze_all_files();
        let scoped: Vec<&FileAnalysis> = match target_files {
            Some(files) => {
                let wanted: HashSet<&PathBuf> = files.iter().collect();
                analyses.iter().filter(|a| wanted.contains(&a.file)).collect()
            }
            None => analyses.iter().collect(),
        };
        let corpus: Vec<String> = scoped.iter().flat_map(|a| a.tags.iter().map(|t| t.name.clone())).collect();

        let mut matches = match match_type {
            MatchType::Fuzzy => FuzzyMatcher::new(threshold).match_query(query, &corpus),
            MatchType::Semantic => {
                let matcher = DomainSemanticMatcher::new();
                matcher.match_query(query, &corpus).into_iter().filter(|m| m.score >= threshold).collect()
            }
            MatchType::Hybrid => {
                let tfidf = AdaptiveSemanticMatcher::new();
                let matcher = HybridMatcher::new(FuzzyMatcher::default(), tfidf, Some(DomainSemanticMatcher::new()), None, threshold);
                matcher.learn(&corpus);
                matcher.match_query(query, &corpus)
            }
        };
        matches.truncate(max_results);
        Ok(matches)
    }

    /// Builds the project's import-level dependency graph.
    pub fn build_dependency_graph(&self) -> Result<DependencyGraph> {
        let (analyses, _failures) = self.analyze_all_files();
        Ok(self.build_advanced_graph(&analyses).graph)
    }

    /// Finds every cycle in the project's dependency graph.
    pub fn find_circular_dependencies(&self) -> Result<Vec<Vec<PathBuf>>> {
        Ok(self.build_dependency_graph()?.find_cycles())
    }

    /// Renders every requested file's centrality scores in the given
    /// [`Layout`], restricted to `files` but computed over the whole
    /// project's graph.
    pub fn analyze_file_centrality(&self, files: &[PathBuf], format: Layout) -> Result<String> {
        let (analyses, _failures) = self.analyze_all_files();
        let advanced = self.build_advanced_graph(&analyses);
        let centrality = CentralityCalculator::new(&advanced.graph);

        let wanted: HashSet<&PathBuf> = files.iter().collect();
        let requested: Vec<FileAnalysis> = analyses.into_iter().filter(|a| wanted.contains(&a.file)).collect();

        let analyzer = LLMAnalyzer::new().with_strategy(SelectionStrategy::CentralityBased).with_layout(format);
        Ok(analyzer.analyze(&advanced, &centrality, &requested).text)
    }

    /// `format` selects between a flat listing and one grouped by
    /// breaking-change level; the risk computation itself is
    /// `format`-independent.
    pub fn analyze_file_impact(&self, files: &[PathBuf], format: Layout) -> Result<String> {
        let (analyses, _failures) = self.analyze_all_files();
        let advanced = self.build_advanced_graph(&analyses);
        let impact_analyzer = repomap_graph::ImpactAnalyzer::new(&advanced, self.project_root.clone());
        let report = impact_analyzer.analyze_change_impact(files);
        Ok(crate::render::render_impact_report(&report, format))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &RepomapConfig {
        &self.config
    }
}

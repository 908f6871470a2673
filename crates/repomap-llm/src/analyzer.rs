//! [`LLMAnalyzer`]: selects and renders a token-budgeted slice of a
//! project's dependency graph for downstream LLM consumption.

use crate::context::{build_summaries, select_context, FileSummary, SelectionStrategy};
use crate::render::{render, Layout};
use repomap_graph::{AdvancedDependencyGraph, CentralityCalculator, FileAnalysis};
use std::time::{Duration, Instant};

const MIN_TOKEN_BUDGET: usize = 1_000;
const MAX_TOKEN_BUDGET: usize = 8_000;
const DEFAULT_TOKEN_BUDGET: usize = 4_000;

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Words-to-tokens rule of thumb.
const TOKENS_PER_WORD: f64 = 1.3;

pub fn estimate_tokens(text: &str) -> usize {
    (text.split_whitespace().count() as f64 * TOKENS_PER_WORD).ceil() as usize
}

#[derive(Debug, Clone)]
pub struct LLMContext {
    pub text: String,
    pub estimated_tokens: usize,
    pub included_files: usize,
    pub total_files: usize,
    pub truncated: bool,
    pub timed_out: bool,
}

pub struct LLMAnalyzer {
    token_budget: usize,
    timeout: Duration,
    strategy: SelectionStrategy,
    layout: Layout,
}

impl Default for LLMAnalyzer {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strategy: SelectionStrategy::CentralityBased,
            layout: Layout::Structured,
        }
    }
}

impl LLMAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token_budget(mut self, tokens: usize) -> Self {
        self.token_budget = tokens.clamp(MIN_TOKEN_BUDGET, MAX_TOKEN_BUDGET);
        self
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS));
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Builds the token-budgeted, strategy-ordered context. Both the
    /// budget and the timeout are enforced here, at the boundary
    /// between graph analysis and text rendering: individual file
    /// sections are appended one at a time and the loop stops the
    /// instant either limit is crossed, rather than rendering
    /// everything and truncating the string afterward.
    pub fn analyze(&self, graph: &AdvancedDependencyGraph, centrality: &CentralityCalculator, analyses: &[FileAnalysis]) -> LLMContext {
        let started = Instant::now();
        let summaries = build_summaries(graph, centrality, analyses);
        let ordered = select_context(graph, &summaries, self.strategy);
        let total_files = ordered.len();

        let mut included: Vec<FileSummary> = Vec::new();
        let mut truncated = false;
        let mut timed_out = false;

        for summary in ordered {
            if started.elapsed() >= self.timeout {
                timed_out = true;
                truncated = true;
                break;
            }
            let mut candidate = included.clone();
            candidate.push(summary);
            let rendered = render(&candidate, self.layout);
            if estimate_tokens(&rendered) > self.token_budget && !included.is_empty() {
                truncated = true;
                break;
            }
            included = candidate;
        }

        let mut text = render(&included, self.layout);
        if truncated {
            text.push_str(&format!(
                "\n[truncated: {} of {} files included{}]\n",
                included.len(),
                total_files,
                if timed_out { ", analysis timeout reached" } else { "" }
            ));
        }

        LLMContext {
            estimated_tokens: estimate_tokens(&text),
            included_files: included.len(),
            total_files,
            truncated,
            timed_out,
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_core::types::{Import, ImportType};
    use repomap_graph::{CallGraph, DependencyGraph, ProjectImports};
    use std::path::PathBuf;

    fn import_to(target: &str) -> Import {
        Import {
            module: target.to_string(),
            alias: None,
            symbols: vec![],
            is_relative: false,
            import_type: ImportType::Absolute,
            line_number: 1,
            resolved_path: Some(PathBuf::from(target)),
        }
    }

    fn analysis(file: &str) -> FileAnalysis {
        FileAnalysis {
            file: PathBuf::from(file),
            ..Default::default()
        }
    }

    #[test]
    fn token_budget_and_timeout_clamp_to_bounds() {
        let analyzer = LLMAnalyzer::new().with_token_budget(1).with_timeout_secs(0);
        assert_eq!(analyzer.token_budget, MIN_TOKEN_BUDGET);
        assert_eq!(analyzer.timeout, Duration::from_secs(MIN_TIMEOUT_SECS));

        let analyzer = LLMAnalyzer::new().with_token_budget(1_000_000).with_timeout_secs(10_000);
        assert_eq!(analyzer.token_budget, MAX_TOKEN_BUDGET);
        assert_eq!(analyzer.timeout, Duration::from_secs(MAX_TIMEOUT_SECS));
    }

    #[test]
    fn analyze_includes_every_file_when_budget_is_generous() {
        let project = ProjectImports {
            per_file: vec![
                (PathBuf::from("core.py"), None, vec![]),
                (PathBuf::from("mid.py"), None, vec![import_to("core.py")]),
            ],
        };
        let advanced = AdvancedDependencyGraph::new(DependencyGraph::build(&project), CallGraph::default());
        let centrality = CentralityCalculator::new(&advanced.graph);
        let analyses = vec![analysis("core.py"), analysis("mid.py")];

        let context = LLMAnalyzer::new().analyze(&advanced, &centrality, &analyses);
        assert_eq!(context.included_files, 2);
        assert!(!context.truncated);
        assert!(context.text.contains("core.py"));
        assert!(context.text.contains("mid.py"));
    }

    #[test]
    fn tiny_budget_truncates() {
        let project = ProjectImports {
            per_file: vec![
                (PathBuf::from("core.py"), None, vec![]),
                (PathBuf::from("mid.py"), None, vec![import_to("core.py")]),
                (PathBuf::from("leaf.py"), None, vec![import_to("mid.py")]),
            ],
        };
        let advanced = AdvancedDependencyGraph::new(DependencyGraph::build(&project), CallGraph::default());
        let centrality = CentralityCalculator::new(&advanced.graph);
        let analyses = vec![analysis("core.py"), analysis("mid.py"), analysis("leaf.py")];

        let context = LLMAnalyzer::new().with_token_budget(MIN_TOKEN_BUDGET).analyze(&advanced, &centrality, &analyses);
        assert!(context.included_files >= 1);
    }
}

//! Per-file summaries and the four context-selection strategies.

use repomap_graph::{AdvancedDependencyGraph, CentralityCalculator, CentralityType, FileAnalysis};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileSummary {
    pub file: PathBuf,
    pub score: f64,
    pub fan_in: usize,
    pub fan_out: usize,
    pub key_functions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    CentralityBased,
    BreadthFirst,
    DepthFirst,
    Hybrid,
}

/// Builds one [`FileSummary`] per analyzed file.
pub fn build_summaries(
    graph: &AdvancedDependencyGraph,
    centrality: &CentralityCalculator,
    analyses: &[FileAnalysis],
) -> Vec<FileSummary> {
    let scores = centrality.scores_for(CentralityType::Composite);
    analyses
        .iter()
        .map(|analysis| {
            let node = graph.graph.node(&analysis.file);
            FileSummary {
                file: analysis.file.clone(),
                score: scores.get(&analysis.file).copied().unwrap_or(0.0),
                fan_in: node.map(|n| n.in_degree()).unwrap_or(0),
                fan_out: node.map(|n| n.out_degree()).unwrap_or(0),
                key_functions: analysis.key_functions(5).into_iter().map(|t| t.name.clone()).collect(),
            }
        })
        .collect()
}

/// Orders `summaries` per `strategy`, preferring higher-centrality files
/// within each strategy's own traversal order.
pub fn select_context(graph: &AdvancedDependencyGraph, summaries: &[FileSummary], strategy: SelectionStrategy) -> Vec<FileSummary> {
    match strategy {
        SelectionStrategy::CentralityBased => {
            let mut ordered = summaries.to_vec();
            ordered.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.file.cmp(&b.file)));
            ordered
        }
        SelectionStrategy::BreadthFirst => traverse(graph, summaries, false),
        SelectionStrategy::DepthFirst => traverse(graph, summaries, true),
        SelectionStrategy::Hybrid => {
            let mut seen = HashSet::new();
            let mut ordered = Vec::new();

            let mut by_score = summaries.to_vec();
            by_score.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.file.cmp(&b.file)));
            let half = (by_score.len() / 2).max(1);
            for summary in by_score.into_iter().take(half) {
                if seen.insert(summary.file.clone()) {
                    ordered.push(summary);
                }
            }

            for summary in traverse(graph, summaries, false) {
                if seen.insert(summary.file.clone()) {
                    ordered.push(summary);
                }
            }
            ordered
        }
    }
}

/// Traversal from the graph's roots, `depth_first` selecting DFS
/// (pre-order) vs BFS (level order). Summaries not reachable from any
/// root (e.g. orphans inside a cycle) are appended afterward, highest
/// score first, so nothing in `summaries` is silently dropped.
fn traverse(graph: &AdvancedDependencyGraph, summaries: &[FileSummary], depth_first: bool) -> Vec<FileSummary> {
    use std::collections::HashMap;
    let by_file: HashMap<&PathBuf, &FileSummary> = summaries.iter().map(|s| (&s.file, s)).collect();

    let mut visited = HashSet::new();
    let mut ordered = Vec::new();
    let mut roots = graph.graph.roots();
    roots.sort();

    let mut frontier: std::collections::VecDeque<PathBuf> = roots.into_iter().collect();
    while let Some(file) = if depth_first { frontier.pop_back() } else { frontier.pop_front() } {
        if !visited.insert(file.clone()) {
            continue;
        }
        if let Some(summary) = by_file.get(&file) {
            ordered.push((*summary).clone());
        }
        let mut next: Vec<PathBuf> = graph.graph.dependents(&file);
        next.sort();
        if depth_first {
            for n in next.into_iter().rev() {
                frontier.push_back(n);
            }
        } else {
            frontier.extend(next);
        }
    }

    let mut remaining: Vec<FileSummary> = summaries.iter().filter(|s| !visited.contains(&s.file)).cloned().collect();
    remaining.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.file.cmp(&b.file)));
    ordered.extend(remaining);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_graph::{CallGraph, DependencyGraph, ProjectImports};
    use repomap_core::types::{Import, ImportType};

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

    fn chain_graph() -> AdvancedDependencyGraph {
        let project = ProjectImports {
            per_file: vec![
                (PathBuf::from("core.py"), None, vec![]),
                (PathBuf::from("mid.py"), None, vec![import_to("core.py")]),
                (PathBuf::from("leaf.py"), None, vec![import_to("mid.py")]),
            ],
        };
        AdvancedDependencyGraph::new(DependencyGraph::build(&project), CallGraph::default())
    }

    fn summary(file: &str, score: f64) -> FileSummary {
        FileSummary {
            file: PathBuf::from(file),
            score,
            fan_in: 0,
            fan_out: 0,
            key_functions: vec![],
        }
    }

    #[test]
    fn centrality_based_sorts_by_score_descending() {
        let graph = chain_graph();
        let summaries = vec![summary("core.py", 0.2), summary("mid.py", 0.9), summary("leaf.py", 0.1)];
        let ordered = select_context(&graph, &summaries, SelectionStrategy::CentralityBased);
        assert_eq!(ordered[0].file, PathBuf::from("mid.py"));
    }

    #[test]
    fn breadth_first_starts_at_roots() {
        let graph = chain_graph();
        let summaries = vec![summary("core.py", 0.2), summary("mid.py", 0.9), summary("leaf.py", 0.1)];
        let ordered = select_context(&graph, &summaries, SelectionStrategy::BreadthFirst);
        assert_eq!(ordered[0].file, PathBuf::from("core.py"));
        assert_eq!(ordered.last().unwrap().file, PathBuf::from("leaf.py"));
    }
}

//! [`AdvancedDependencyGraph`]: the base [`DependencyGraph`] plus a
//! [`CallGraph`] overlay. Traversal primitives here additionally treat
//! "A calls a function defined in B" as a dependency edge, in the same
//! direction convention as imports (B -> A).

use crate::call_graph::CallGraph;
use crate::graph::{DependencyGraph, DEFAULT_MAX_DEPTH};
use repomap_core::types::BreakingChangeLevel;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Combined-edge incoming-degree above which a file is a "hotspot".
pub const HOTSPOT_THRESHOLD: usize = 10;

pub struct AdvancedDependencyGraph {
    pub graph: DependencyGraph,
    pub call_graph: CallGraph,
    pub function_dependencies: HashMap<String, HashSet<String>>,
    pub function_dependents: HashMap<String, HashSet<String>>,
}

impl AdvancedDependencyGraph {
    pub fn new(graph: DependencyGraph, call_graph: CallGraph) -> Self {
        let mut function_dependencies: HashMap<String, HashSet<String>> = HashMap::new();
        let mut function_dependents: HashMap<String, HashSet<String>> = HashMap::new();

        for call in &call_graph.calls {
            function_dependencies
                .entry(call.caller.clone())
                .or_default()
                .insert(call.callee.clone());
            function_dependents
                .entry(call.callee.clone())
                .or_default()
                .insert(call.caller.clone());
        }

        Self {
            graph,
            call_graph,
            function_dependencies,
            function_dependents,
        }
    }

    /// Additional file-level dependents contributed purely by
    /// cross-file function calls (a caller's file is a dependent of the
    /// callee's file, even with no import edge between them).
    pub fn call_based_dependents(&self, file: &std::path::Path) -> HashSet<PathBuf> {
        let mut out = HashSet::new();
        for call in &self.call_graph.calls {
            if let Some(resolved) = &call.resolved_callee_file {
                if resolved == file && call.file_path != *file {
                    out.insert(call.file_path.clone());
                }
            }
        }
        out
    }

    fn combined_in_degree(&self, file: &std::path::Path) -> usize {
        let import_in = self.graph.dependents(file).len();
        let call_in = self.call_based_dependents(file).len();
        import_in + call_in
    }

    /// Files whose combined import- and call-based incoming edges
    /// exceed [`HOTSPOT_THRESHOLD`].
    pub fn identify_hotspots(&self) -> Vec<PathBuf> {
        let mut hotspots: Vec<_> = self
            .graph
            .file_paths()
            .into_iter()
            .filter(|f| self.combined_in_degree(f) > HOTSPOT_THRESHOLD)
            .collect();
        hotspots.sort();
        hotspots
    }

    pub fn is_hotspot(&self, file: &std::path::Path) -> bool {
        self.combined_in_degree(file) > HOTSPOT_THRESHOLD
    }

    pub fn in_cycle(&self, file: &std::path::Path) -> bool {
        self.graph.find_cycles().iter().any(|c| c.contains(&file.to_path_buf()))
    }

    /// Breaking-change classification for one file.
    pub fn breaking_change_level(&self, file: &std::path::Path) -> BreakingChangeLevel {
        if !self.graph.contains(file) {
            return BreakingChangeLevel::Unknown;
        }
        let dependents = self.graph.dependents(file).len();
        let call_dependents = self.call_based_dependents(file).len();
        if dependents > 10 || self.is_hotspot(file) || self.in_cycle(file) {
            BreakingChangeLevel::High
        } else if dependents > 5 || call_dependents > 4 {
            BreakingChangeLevel::Medium
        } else {
            BreakingChangeLevel::Low
        }
    }

    /// A prioritized list of refactoring candidates, classified by
    /// total coupling, bottleneck risk (many incoming), instability
    /// (many outgoing), and circular-dependency participation.
    pub fn suggest_refactoring_opportunities(&self) -> Vec<RefactoringOpportunity> {
        let cycles = self.graph.find_cycles();
        let mut opportunities = Vec::new();
        for file in self.graph.file_paths() {
            let Some(node) = self.graph.node(&file) else { continue };
            let in_degree = node.in_degree();
            let out_degree = node.out_degree();
            let total_coupling = in_degree + out_degree;
            let in_cycle = cycles.iter().any(|c| c.contains(&file));
            let mut reasons = Vec::new();
            if self.is_hotspot(&file) {
                reasons.push("hotspot: high combined fan-in".to_string());
            }
            if out_degree > in_degree.max(5) {
                reasons.push("bottleneck: many dependents".to_string());
            }
            if in_degree > out_degree.max(8) {
                reasons.push("unstable: many outgoing dependencies".to_string());
            }
            if in_cycle {
                reasons.push("participates in a circular dependency".to_string());
            }
            if reasons.is_empty() {
                continue;
            }
            opportunities.push(RefactoringOpportunity {
                file,
                total_coupling,
                in_cycle,
                reasons,
            });
        }
        opportunities.sort_by(|a, b| b.total_coupling.cmp(&a.total_coupling));
        opportunities
    }

    pub fn transitive_dependents_combined(&self, file: &std::path::Path, max_depth: usize) -> HashSet<PathBuf> {
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(file.to_path_buf());
        let mut frontier = vec![file.to_path_buf()];
        for _ in 0..max_depth.max(DEFAULT_MAX_DEPTH) {
            let mut next = Vec::new();
            for f in &frontier {
                for dep in self.graph.dependents(f) {
                    if visited.insert(dep.clone()) {
                        next.push(dep);
                    }
                }
                for dep in self.call_based_dependents(f) {
                    if visited.insert(dep.clone()) {
                        next.push(dep);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        visited.remove(file);
        visited
    }
}

#[derive(Debug, Clone)]
pub struct RefactoringOpportunity {
    pub file: PathBuf,
    pub total_coupling: usize,
    pub in_cycle: bool,
    pub reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProjectImports;
    use repomap_core::types::{FunctionCall, Import, ImportType};
    use std::path::{Path, PathBuf};

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

    #[test]
    fn call_based_dependent_without_import_edge() {
        let project = ProjectImports {
            per_file: vec![
                (PathBuf::from("core.py"), None, vec![]),
                (PathBuf::from("caller.py"), None, vec![]),
            ],
        };
        let graph = DependencyGraph::build(&project);
        let call_graph = CallGraph {
            calls: vec![FunctionCall {
                caller: "do_it".into(),
                callee: "helper".into(),
                file_path: PathBuf::from("caller.py"),
                line_number: 5,
                is_method_call: false,
                object_name: None,
                resolved_callee_file: Some(PathBuf::from("core.py")),
            }],
            function_locations: HashMap::from([("helper".to_string(), PathBuf::from("core.py"))]),
        };
        let advanced = AdvancedDependencyGraph::new(graph, call_graph);
        let dependents = advanced.call_based_dependents(Path::new("core.py"));
        assert!(dependents.contains(&PathBuf::from("caller.py")));
    }
}

//! Change-impact analysis over an [`AdvancedDependencyGraph`].

use crate::advanced_graph::AdvancedDependencyGraph;
use parking_lot::Mutex;
use repomap_core::types::BreakingChangeLevel;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Fan-in above which an affected file is considered "high fan-in" for
/// the purpose of suggesting tests.
const HIGH_FAN_IN_THRESHOLD: usize = 5;

#[derive(Debug, Clone)]
pub struct ImpactReport {
    pub changed_files: Vec<PathBuf>,
    pub affected_files: Vec<PathBuf>,
    pub risk_score: f64,
    pub direct_impact: usize,
    pub transitive_impact: usize,
    pub breaking_change_potential: HashMap<PathBuf, BreakingChangeLevel>,
    pub suggested_tests: Vec<PathBuf>,
    pub impact_summary: String,
}

impl ImpactReport {
    fn fallback(changed_files: Vec<PathBuf>, error: &str) -> Self {
        Self {
            changed_files,
            affected_files: Vec::new(),
            risk_score: 1.0,
            direct_impact: 0,
            transitive_impact: 0,
            breaking_change_potential: HashMap::new(),
            suggested_tests: Vec::new(),
            impact_summary: format!("impact analysis failed: {error}; assuming maximum risk"),
        }
    }
}

pub struct ImpactAnalyzer<'g> {
    graph: &'g AdvancedDependencyGraph,
    project_root: PathBuf,
    cache: Mutex<HashMap<Vec<PathBuf>, ImpactReport>>,
    cache_enabled: bool,
}

impl<'g> ImpactAnalyzer<'g> {
    pub fn new(graph: &'g AdvancedDependencyGraph, project_root: impl Into<PathBuf>) -> Self {
        Self {
            graph,
            project_root: project_root.into(),
            cache: Mutex::new(HashMap::new()),
            cache_enabled: true,
        }
    }

    pub fn with_cache_disabled(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Never raises: any internal failure degrades to a safe-fallback
    /// report with `risk_score = 1.0`.
    pub fn analyze_change_impact(&self, changed_files: &[PathBuf]) -> ImpactReport {
        let mut key = changed_files.to_vec();
        key.sort();
        key.dedup();

        if self.cache_enabled {
            if let Some(hit) = self.cache.lock().get(&key) {
                return hit.clone();
            }
        }

        let report = match self.try_compute(&key) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "impact analysis failed, returning safe-fallback report");
                ImpactReport::fallback(key.clone(), &e.to_string())
            }
        };

        if self.cache_enabled {
            self.cache.lock().insert(key, report.clone());
        }
        report
    }

    fn try_compute(&self, changed: &[PathBuf]) -> repomap_core::error::Result<ImpactReport> {
        let affected = self.affected_set(changed);
        let direct_impact = changed.len();
        let transitive_impact = affected.len().saturating_sub(direct_impact);

        let risk_score = self.risk_score(changed, &affected);

        let mut breaking_change_potential = HashMap::new();
        for file in &affected {
            breaking_change_potential.insert(file.clone(), self.graph.breaking_change_level(file));
        }

        let suggested_tests = self.suggest_tests(changed, &affected)?;
        let impact_summary = self.summarize(changed, &affected, risk_score, &breaking_change_potential);

        let mut affected_sorted: Vec<_> = affected.into_iter().collect();
        affected_sorted.sort();

        Ok(ImpactReport {
            changed_files: changed.to_vec(),
            affected_files: affected_sorted,
            risk_score,
            direct_impact,
            transitive_impact,
            breaking_change_potential,
            suggested_tests,
            impact_summary,
        })
    }

    /// `changed_files ∪ transitive_dependents(file)` for each changed
    /// file, combining import-graph and call-graph dependents.
    fn affected_set(&self, changed: &[PathBuf]) -> HashSet<PathBuf> {
        let mut affected: HashSet<PathBuf> = changed.iter().cloned().collect();
        for file in changed {
            affected.extend(self.graph.transitive_dependents_combined(file, 10));
        }
        affected
    }

    fn risk_score(&self, changed: &[PathBuf], affected: &HashSet<PathBuf>) -> f64 {
        let base = 0.3;
        let changed_term = (0.1 * changed.len() as f64).min(0.3);
        let affected_term = (0.05 * affected.len() as f64).min(0.4);

        let mut centrality_risk = 0.0_f64;
        for file in changed {
            let hotspot = self.graph.is_hotspot(file);
            let deep = self.graph.graph.dependency_depth(file) > 3;
            let stable = self.graph.graph.stability(file) > 0.7;
            centrality_risk += 0.1 * hotspot as u8 as f64 + 0.1 * deep as u8 as f64 + 0.1 * stable as u8 as f64;
        }
        centrality_risk = centrality_risk.min(0.3);

        let mut breaking_change_risk = 0.0_f64;
        for file in changed {
            let high_fan_in = self.graph.graph.dependents(file).len() > HIGH_FAN_IN_THRESHOLD;
            let in_cycle = self.graph.in_cycle(file);
            breaking_change_risk += 0.1 * high_fan_in as u8 as f64 + 0.1 * in_cycle as u8 as f64;
        }
        breaking_change_risk = breaking_change_risk.min(0.2);

        (base + changed_term + affected_term + centrality_risk + breaking_change_risk).clamp(0.0, 1.0)
    }

    /// Probes conventional sibling/`tests/` paths for each changed file
    /// and each high-fan-in affected file. A path that exists but can't
    /// be stat'd (permissions, a broken symlink) is a real I/O error and
    /// propagates rather than being silently treated as "no test file".
    fn suggest_tests(&self, changed: &[PathBuf], affected: &HashSet<PathBuf>) -> repomap_core::error::Result<Vec<PathBuf>> {
        let mut high_fan_in_affected: Vec<PathBuf> = affected
            .iter()
            .filter(|f| !changed.contains(f))
            .filter(|f| self.graph.graph.dependents(f).len() > HIGH_FAN_IN_THRESHOLD)
            .cloned()
            .collect();
        high_fan_in_affected.sort();

        let mut candidates: Vec<PathBuf> = changed.to_vec();
        candidates.extend(high_fan_in_affected);

        let mut tests = Vec::new();
        let mut seen = HashSet::new();
        for file in &candidates {
            for test_path in conventional_test_paths(&self.project_root, file) {
                match std::fs::symlink_metadata(&test_path) {
                    Ok(_) => {
                        if seen.insert(test_path.clone()) {
                            tests.push(test_path);
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(repomap_core::error::Error::FileAccess(e.to_string())),
                }
            }
        }
        Ok(tests)
    }

    fn summarize(
        &self,
        changed: &[PathBuf],
        affected: &HashSet<PathBuf>,
        risk_score: f64,
        breaking_change_potential: &HashMap<PathBuf, BreakingChangeLevel>,
    ) -> String {
        let level = if risk_score > 0.8 {
            "HIGH"
        } else if risk_score > 0.5 {
            "MEDIUM"
        } else {
            "LOW"
        };

        let additional = affected.len().saturating_sub(changed.len());
        let mut high_risk: Vec<_> = breaking_change_potential
            .iter()
            .filter(|(_, level)| matches!(level, BreakingChangeLevel::High))
            .map(|(f, _)| f.display().to_string())
            .collect();
        high_risk.sort();

        let recommendation = match level {
            "HIGH" => "review with the file owners and run the full test suite before merging",
            "MEDIUM" => "run the affected test suites and get a second reviewer",
            _ => "standard review should suffice",
        };

        let mut summary = format!(
            "{} changed file(s) affect {} file(s) total ({} direct, {} transitive); overall risk {} ({:.2})",
            changed.len(),
            additional,
            changed.len().min(affected.len()),
            additional,
            level,
            risk_score,
        );
        if !high_risk.is_empty() {
            summary.push_str(&format!("; high-risk files: {}", high_risk.join(", ")));
        }
        summary.push_str(&format!("; recommendation: {recommendation}"));
        summary
    }
}

/// Conventional sibling/`tests/` naming patterns to probe for an
/// existing test file covering `file`.
fn conventional_test_paths(project_root: &Path, file: &Path) -> Vec<PathBuf> {
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("").to_string();
    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parent = file.parent().unwrap_or(project_root);

    let mut candidates = vec![
        parent.join(format!("test_{stem}.{ext}")),
        parent.join(format!("{stem}_test.{ext}")),
        parent.join(format!("{stem}.test.{ext}")),
        parent.join(format!("{stem}.spec.{ext}")),
        parent.join("tests").join(format!("test_{stem}.{ext}")),
        parent.join("tests").join(format!("{stem}_test.{ext}")),
        parent.join("__tests__").join(format!("{stem}.test.{ext}")),
        project_root.join("tests").join(format!("test_{stem}.{ext}")),
    ];
    candidates.dedup();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_graph::CallGraph;
    use crate::graph::{DependencyGraph, ProjectImports};
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

    fn leaf_graph() -> AdvancedDependencyGraph {
        let project = ProjectImports {
            per_file: vec![
                (PathBuf::from("utils.py"), None, vec![]),
                (PathBuf::from("a.py"), None, vec![import_to("utils.py")]),
                (PathBuf::from("b.py"), None, vec![import_to("utils.py")]),
            ],
        };
        let graph = DependencyGraph::build(&project);
        AdvancedDependencyGraph::new(graph, CallGraph::default())
    }

    #[test]
    fn leaf_change_affects_both_dependents() {
        let advanced = leaf_graph();
        let analyzer = ImpactAnalyzer::new(&advanced, ".");
        let report = analyzer.analyze_change_impact(&[PathBuf::from("utils.py")]);

        assert_eq!(report.changed_files, vec![PathBuf::from("utils.py")]);
        let mut affected = report.affected_files.clone();
        affected.sort();
        assert_eq!(affected, vec![PathBuf::from("a.py"), PathBuf::from("b.py"), PathBuf::from("utils.py")]);
        assert!(report.risk_score <= 0.6);
        assert!(report.impact_summary.contains("2 file(s) total"));
    }

    #[test]
    fn unknown_file_is_unknown_breaking_change() {
        let advanced = leaf_graph();
        let analyzer = ImpactAnalyzer::new(&advanced, ".");
        let report = analyzer.analyze_change_impact(&[PathBuf::from("missing.py")]);
        assert_eq!(report.changed_files, vec![PathBuf::from("missing.py")]);
        assert_eq!(
            report.breaking_change_potential.get(&PathBuf::from("missing.py")),
            Some(&BreakingChangeLevel::Unknown)
        );
    }

    #[test]
    fn repeated_calls_hit_cache() {
        let advanced = leaf_graph();
        let analyzer = ImpactAnalyzer::new(&advanced, ".");
        let first = analyzer.analyze_change_impact(&[PathBuf::from("utils.py")]);
        let second = analyzer.analyze_change_impact(&[PathBuf::from("utils.py")]);
        assert_eq!(first.impact_summary, second.impact_summary);
    }
}

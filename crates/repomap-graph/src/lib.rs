//! The dependency graph, its call-graph overlay, centrality measures,
//! and change-impact analysis.

pub mod advanced_graph;
pub mod call_graph;
pub mod centrality;
pub mod density;
pub mod file_analyzer;
pub mod graph;
pub mod impact;
pub mod import_analyzer;

pub use advanced_graph::{AdvancedDependencyGraph, RefactoringOpportunity, HOTSPOT_THRESHOLD};
pub use call_graph::{build_call_graph, CallGraph, CallGraphBuildStats};
pub use centrality::{CentralityCalculator, CentralityType, CompositeWeights};
pub use density::{CategoryCounts, DensityAnalyzer, FileDensity};
pub use file_analyzer::{FileAnalysis, FileAnalyzer};
pub use graph::{DependencyGraph, DependencyNode, ProjectImports, DEFAULT_MAX_DEPTH};
pub use impact::{ImpactAnalyzer, ImpactReport};
pub use import_analyzer::{extract_imports, mark_outside_root_external, resolve_imports};

//! Facade crate wiring the core analysis engine into the six
//! project-level operations that form the boundary to an outer
//! CLI/config loader/console renderer (none of which live here).

pub mod engine;
pub mod render;
pub mod types;

pub use engine::RepomapEngine;
pub use types::{MatchType, ProjectInfo};

pub use repomap_llm::Layout;

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_core::config::RepomapConfig;
    use std::fs;

    fn engine_for(root: &std::path::Path) -> RepomapEngine {
        let mut config = RepomapConfig::default();
        config.project_root = root.to_path_buf();
        std::env::set_var("REPOMAP_DISABLE_CACHE", "1");
        RepomapEngine::new(config).unwrap()
    }

    #[test]
    fn analyze_project_counts_files_and_languages() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();
        fs::write(dir.path().join("b.py"), "def g():\n    f()\n").unwrap();

        let engine = engine_for(dir.path());
        let info = engine.analyze_project().unwrap();
        assert_eq!(info.file_count, 2);
        assert!(info.identifier_count >= 2);
        assert!(info.failures.is_empty());
    }

    #[test]
    fn build_dependency_graph_links_import() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("utils.py"), "def helper():\n    pass\n").unwrap();
        fs::write(dir.path().join("main.py"), "import utils\n\nutils.helper()\n").unwrap();

        let engine = engine_for(dir.path());
        let graph = engine.build_dependency_graph().unwrap();
        let utils = dir.path().canonicalize().unwrap().join("utils.py");
        let main = dir.path().canonicalize().unwrap().join("main.py");
        assert!(graph.dependents(&utils).contains(&main));
    }

    #[test]
    fn find_circular_dependencies_detects_a_cycle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "import b\n").unwrap();
        fs::write(dir.path().join("b.py"), "import a\n").unwrap();

        let engine = engine_for(dir.path());
        let cycles = engine.find_circular_dependencies().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
    }

    #[test]
    fn search_identifiers_finds_exact_fuzzy_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def get_user():\n    pass\n").unwrap();

        let engine = engine_for(dir.path());
        let matches = engine.search_identifiers("get_user", MatchType::Fuzzy, 70, 10, None).unwrap();
        assert!(matches.iter().any(|m| m.identifier == "get_user" && m.score == 100));
    }

    #[test]
    fn empty_project_yields_empty_everything() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_for(dir.path());
        let info = engine.analyze_project().unwrap();
        assert_eq!(info.file_count, 0);
        assert_eq!(info.identifier_count, 0);
        let graph = engine.build_dependency_graph().unwrap();
        assert!(graph.is_empty());
    }
}

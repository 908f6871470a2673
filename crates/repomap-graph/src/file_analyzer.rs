//! Single-file facade combining tag extraction, import resolution, and
//! call extraction — the one-stop-shop `ImpactAnalyzer`'s
//! test-suggestion step and `LLMAnalyzer`'s "key functions" section
//! both want instead of calling three subsystems directly.

use crate::call_graph;
use crate::import_analyzer;
use repomap_core::types::{CodeTag, FunctionCall, Import, TagKind};
use repomap_core::Language;
use repomap_parser::parser::TreeSitterParser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    pub file: PathBuf,
    pub language: Option<Language>,
    pub tags: Vec<CodeTag>,
    pub imports: Vec<Import>,
    pub calls: Vec<FunctionCall>,
}

impl FileAnalysis {
    pub fn definitions(&self) -> Vec<&CodeTag> {
        self.tags.iter().filter(|t| matches!(t.kind, TagKind::Definition | TagKind::Method | TagKind::Class)).collect()
    }

    pub fn key_functions(&self, limit: usize) -> Vec<&CodeTag> {
        let mut defs = self.definitions();
        defs.sort_by(|a, b| self.call_graph_weight(b).cmp(&self.call_graph_weight(a)).then_with(|| a.line.cmp(&b.line)));
        defs.truncate(limit);
        defs
    }

    fn call_graph_weight(&self, tag: &CodeTag) -> usize {
        self.calls.iter().filter(|c| c.callee == tag.name).count()
    }
}

pub struct FileAnalyzer<'a> {
    parser: &'a TreeSitterParser,
    project_root: PathBuf,
}

impl<'a> FileAnalyzer<'a> {
    pub fn new(parser: &'a TreeSitterParser, project_root: impl Into<PathBuf>) -> Self {
        Self {
            parser,
            project_root: project_root.into(),
        }
    }

    /// Extract tags, resolve imports, and attribute calls for one file
    /// in a single call. `project_files` is the analyzable-file set used
    /// for import resolution; an empty set is valid and simply leaves
    /// every import external. `Err` only when the file can no longer be
    /// stat'd (e.g. deleted between discovery and analysis); callers
    /// driving a batch should record it and keep going rather than abort.
    pub fn analyze(&self, file: &Path, project_files: &HashSet<PathBuf>) -> Result<FileAnalysis, String> {
        if let Err(e) = std::fs::metadata(file) {
            return Err(e.to_string());
        }

        let tags = self.parser.parse_file(file);
        let language = self.parser.language_for(file);

        let imports = match &language {
            Some(lang) => {
                let raw = import_analyzer::extract_imports(lang, &tags);
                import_analyzer::resolve_imports(&self.project_root, file, raw, lang, project_files)
            }
            None => Vec::new(),
        };

        // Callee-file resolution needs the whole project's definition
        // map and is left to `CallGraphBuilder`; this facade only
        // attributes calls to their enclosing definition.
        let calls = call_graph::extract_calls(file, &tags);

        Ok(FileAnalysis {
            file: file.to_path_buf(),
            language,
            tags,
            imports,
            calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyzes_simple_python_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.py");
        std::fs::write(&file, "import os\n\ndef f():\n    helper()\n").unwrap();

        let parser = TreeSitterParser::new(None);
        let analyzer = FileAnalyzer::new(&parser, dir.path());
        let analysis = analyzer.analyze(&file, &HashSet::new()).unwrap();

        assert_eq!(analysis.language, Some(Language::Python));
        assert!(analysis.imports.iter().any(|i| i.module == "os"));
        assert!(analysis.calls.iter().any(|c| c.callee == "helper"));
        assert!(analysis.definitions().iter().any(|d| d.name == "f"));
    }

    #[test]
    fn missing_file_reports_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.py");

        let parser = TreeSitterParser::new(None);
        let analyzer = FileAnalyzer::new(&parser, dir.path());
        assert!(analyzer.analyze(&file, &HashSet::new()).is_err());
    }
}

//! Project file enumeration with language, test, and exclusion filters.

use crate::language::EXTENSIONS;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    "__pycache__",
    "target",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".repomap",
    ".repomap-tool",
];

const TEST_SUFFIXES: &[&str] = &[".spec.", ".test.", "__test__", "test_", ".min.", ".bundle.", ".d.ts"];

pub struct FileDiscovery {
    root: PathBuf,
    recognized: HashSet<&'static str>,
    all_files: Mutex<Option<Vec<PathBuf>>>,
}

impl FileDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recognized: EXTENSIONS.iter().copied().collect(),
            all_files: Mutex::new(None),
        }
    }

    /// Every file under the project root, excluding standard build/VCS
    /// directories. Memoized until [`FileDiscovery::invalidate`] is
    /// called.
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut cache = self.all_files.lock();
        if let Some(files) = cache.as_ref() {
            return files.clone();
        }
        let files = self.walk();
        *cache = Some(files.clone());
        files
    }

    /// Files whose extension is in the recognized language set,
    /// optionally excluding test files.
    pub fn code_files(&self, exclude_tests: bool) -> Vec<PathBuf> {
        self.all_files()
            .into_iter()
            .filter(|p| self.is_recognized_language(p))
            .filter(|p| !exclude_tests || !Self::is_test_file(p))
            .collect()
    }

    /// Alias for `code_files` kept distinct: `analyzable_files` is the
    /// view downstream analyzers (import/call extraction, matching)
    /// should use.
    pub fn analyzable_files(&self, exclude_tests: bool) -> Vec<PathBuf> {
        self.code_files(exclude_tests)
    }

    pub fn invalidate(&self) {
        *self.all_files.lock() = None;
    }

    fn is_recognized_language(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.recognized.contains(e))
            .unwrap_or(false)
    }

    pub fn is_test_file(path: &Path) -> bool {
        let name = path.to_string_lossy().to_lowercase();
        TEST_SUFFIXES.iter().any(|suffix| name.contains(suffix))
    }

    fn walk(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let walker = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            if entry.file_type().is_dir() {
                let name = entry.file_name().to_string_lossy();
                return !EXCLUDED_DIRS.contains(&name.as_ref());
            }
            true
        });
        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                if let Ok(abs) = entry.path().canonicalize() {
                    out.push(abs);
                } else {
                    out.push(entry.path().to_path_buf());
                }
            }
        }
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_excluded_directories_and_tests() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/ignored.py"), "x = 1").unwrap();
        std::fs::write(dir.path().join("main.py"), "x = 1").unwrap();
        std::fs::write(dir.path().join("test_main.py"), "x = 1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let discovery = FileDiscovery::new(dir.path());
        let code = discovery.code_files(true);
        assert_eq!(code.len(), 1);
        assert!(code[0].ends_with("main.py"));

        let with_tests = discovery.code_files(false);
        assert_eq!(with_tests.len(), 2);
    }
}

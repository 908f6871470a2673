//! Per-file and per-package identifier density, categorized by
//! identifier kind, with a density ratio used to flag over-dense files.

use repomap_core::types::{CodeTag, TagKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identifiers per source line above which a file is flagged dense
/// enough to be worth splitting up.
pub const DENSE_FILE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryCounts {
    pub definitions: usize,
    pub classes: usize,
    pub methods: usize,
    pub variables: usize,
    pub imports: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.definitions + self.classes + self.methods + self.variables + self.imports
    }

    fn add(&mut self, kind: TagKind) {
        match kind {
            TagKind::Definition => self.definitions += 1,
            TagKind::Class => self.classes += 1,
            TagKind::Method => self.methods += 1,
            TagKind::Variable => self.variables += 1,
            TagKind::Import => self.imports += 1,
            TagKind::Reference | TagKind::Call | TagKind::Other => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileDensity {
    pub file: PathBuf,
    pub counts: CategoryCounts,
    pub line_count: usize,
    pub density: f64,
    pub is_dense: bool,
}

pub struct DensityAnalyzer;

impl DensityAnalyzer {
    /// Per-file identifier counts by category and the identifier-count
    /// / line-count density ratio.
    pub fn analyze_file(file: &Path, tags: &[CodeTag], line_count: usize) -> FileDensity {
        let mut counts = CategoryCounts::default();
        for tag in tags {
            counts.add(tag.kind);
        }
        let density = if line_count == 0 { 0.0 } else { counts.total() as f64 / line_count as f64 };
        FileDensity {
            file: file.to_path_buf(),
            counts,
            line_count,
            density,
            is_dense: density > DENSE_FILE_THRESHOLD,
        }
    }

    pub fn analyze_project(files: &[(PathBuf, Vec<CodeTag>, usize)]) -> Vec<FileDensity> {
        let mut results: Vec<_> = files.iter().map(|(f, tags, lines)| Self::analyze_file(f, tags, *lines)).collect();
        results.sort_by(|a, b| a.file.cmp(&b.file));
        results
    }

    /// Groups per-file results by their immediate parent directory and
    /// sums counts/lines per "package".
    pub fn by_package(files: &[FileDensity]) -> HashMap<PathBuf, FileDensity> {
        let mut packages: HashMap<PathBuf, FileDensity> = HashMap::new();
        for f in files {
            let package = f.file.parent().map(Path::to_path_buf).unwrap_or_default();
            let entry = packages.entry(package.clone()).or_insert_with(|| FileDensity {
                file: package,
                counts: CategoryCounts::default(),
                line_count: 0,
                density: 0.0,
                is_dense: false,
            });
            entry.counts.definitions += f.counts.definitions;
            entry.counts.classes += f.counts.classes;
            entry.counts.methods += f.counts.methods;
            entry.counts.variables += f.counts.variables;
            entry.counts.imports += f.counts.imports;
            entry.line_count += f.line_count;
        }
        for entry in packages.values_mut() {
            entry.density = if entry.line_count == 0 { 0.0 } else { entry.counts.total() as f64 / entry.line_count as f64 };
            entry.is_dense = entry.density > DENSE_FILE_THRESHOLD;
        }
        packages
    }

    /// Files whose density exceeds [`DENSE_FILE_THRESHOLD`], sorted
    /// densest first.
    pub fn over_dense_files(files: &[FileDensity]) -> Vec<PathBuf> {
        let mut dense: Vec<_> = files.iter().filter(|f| f.is_dense).collect();
        dense.sort_by(|a, b| b.density.partial_cmp(&a.density).unwrap_or(std::cmp::Ordering::Equal));
        dense.into_iter().map(|f| f.file.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(kind: TagKind) -> CodeTag {
        CodeTag::new("x", kind, PathBuf::from("a.py"), 1, 0)
    }

    #[test]
    fn counts_by_category() {
        let tags = vec![tag(TagKind::Definition), tag(TagKind::Class), tag(TagKind::Import), tag(TagKind::Import)];
        let density = DensityAnalyzer::analyze_file(Path::new("a.py"), &tags, 10);
        assert_eq!(density.counts.definitions, 1);
        assert_eq!(density.counts.classes, 1);
        assert_eq!(density.counts.imports, 2);
        assert_eq!(density.density, 0.4);
        assert!(!density.is_dense);
    }

    #[test]
    fn empty_file_has_zero_density() {
        let density = DensityAnalyzer::analyze_file(Path::new("empty.py"), &[], 0);
        assert_eq!(density.density, 0.0);
    }

    #[test]
    fn dense_file_flagged_over_threshold() {
        let tags: Vec<_> = (0..6).map(|_| tag(TagKind::Definition)).collect();
        let density = DensityAnalyzer::analyze_file(Path::new("a.py"), &tags, 10);
        assert!(density.is_dense);
    }

    #[test]
    fn package_aggregation_sums_files() {
        let files = vec![
            DensityAnalyzer::analyze_file(Path::new("pkg/a.py"), &[tag(TagKind::Definition)], 10),
            DensityAnalyzer::analyze_file(Path::new("pkg/b.py"), &[tag(TagKind::Definition)], 10),
        ];
        let packages = DensityAnalyzer::by_package(&files);
        let pkg = packages.get(Path::new("pkg")).unwrap();
        assert_eq!(pkg.counts.definitions, 2);
        assert_eq!(pkg.line_count, 20);
    }
}

//! Text layouts for LLM consumption: `Structured` lists one flat
//! section per file, `Hierarchical` groups sections by directory.

use crate::context::FileSummary;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Structured,
    Hierarchical,
}

fn file_section(summary: &FileSummary) -> String {
    let mut section = String::new();
    let _ = writeln!(section, "### {}", summary.file.display());
    let _ = writeln!(section, "- importance: {:.2}", summary.score);
    let _ = writeln!(section, "- fan-in: {}, fan-out: {}", summary.fan_in, summary.fan_out);
    if !summary.key_functions.is_empty() {
        let _ = writeln!(section, "- key functions: {}", summary.key_functions.join(", "));
    }
    section
}

pub fn render_structured(summaries: &[FileSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        out.push_str(&file_section(summary));
        out.push('\n');
    }
    out
}

pub fn render_hierarchical(summaries: &[FileSummary]) -> String {
    let mut by_dir: BTreeMap<PathBuf, Vec<&FileSummary>> = BTreeMap::new();
    for summary in summaries {
        let dir = summary.file.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        by_dir.entry(dir).or_default().push(summary);
    }

    let mut out = String::new();
    for (dir, files) in by_dir {
        let label = if dir.as_os_str().is_empty() { ".".to_string() } else { dir.display().to_string() };
        let _ = writeln!(out, "## {label}");
        for summary in files {
            out.push_str(&file_section(summary));
        }
        out.push('\n');
    }
    out
}

pub fn render(summaries: &[FileSummary], layout: Layout) -> String {
    match layout {
        Layout::Structured => render_structured(summaries),
        Layout::Hierarchical => render_hierarchical(summaries),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(file: &str) -> FileSummary {
        FileSummary {
            file: PathBuf::from(file),
            score: 0.5,
            fan_in: 2,
            fan_out: 1,
            key_functions: vec!["run".to_string()],
        }
    }

    #[test]
    fn structured_lists_each_file_once() {
        let rendered = render_structured(&[summary("a.py"), summary("sub/b.py")]);
        assert!(rendered.contains("### a.py"));
        assert!(rendered.contains("### sub/b.py"));
    }

    #[test]
    fn hierarchical_groups_by_directory() {
        let rendered = render_hierarchical(&[summary("sub/a.py"), summary("sub/b.py"), summary("c.py")]);
        assert!(rendered.contains("## sub"));
        assert!(rendered.contains("## ."));
    }
}

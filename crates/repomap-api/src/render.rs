//! Text rendering for [`repomap_graph::ImpactReport`]. `Structured`
//! lists affected files flat; `Hierarchical` groups them by
//! breaking-change level.

use repomap_core::types::BreakingChangeLevel;
use repomap_graph::ImpactReport;
use repomap_llm::Layout;
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub fn render_impact_report(report: &ImpactReport, format: Layout) -> String {
    match format {
        Layout::Structured => render_structured(report),
        Layout::Hierarchical => render_hierarchical(report),
    }
}

fn render_structured(report: &ImpactReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.impact_summary);
    let _ = writeln!(out, "risk_score: {:.2}", report.risk_score);
    for file in &report.affected_files {
        let level = report.breaking_change_potential.get(file).copied().unwrap_or(BreakingChangeLevel::Unknown);
        let _ = writeln!(out, "- {} [{}]", file.display(), level.as_str());
    }
    out
}

fn render_hierarchical(report: &ImpactReport) -> String {
    let mut by_level: BTreeMap<&'static str, Vec<&std::path::PathBuf>> = BTreeMap::new();
    for file in &report.affected_files {
        let level = report.breaking_change_potential.get(file).copied().unwrap_or(BreakingChangeLevel::Unknown);
        by_level.entry(level.as_str()).or_default().push(file);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", report.impact_summary);
    let _ = writeln!(out, "risk_score: {:.2}", report.risk_score);
    for level in ["HIGH", "MEDIUM", "LOW", "UNKNOWN"] {
        let Some(files) = by_level.get(level) else { continue };
        let _ = writeln!(out, "## {level}");
        for file in files {
            let _ = writeln!(out, "- {}", file.display());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn report() -> ImpactReport {
        let mut breaking_change_potential = HashMap::new();
        breaking_change_potential.insert(PathBuf::from("a.py"), BreakingChangeLevel::High);
        breaking_change_potential.insert(PathBuf::from("b.py"), BreakingChangeLevel::Low);
        ImpactReport {
            changed_files: vec![PathBuf::from("a.py")],
            affected_files: vec![PathBuf::from("a.py"), PathBuf::from("b.py")],
            risk_score: 0.55,
            direct_impact: 1,
            transitive_impact: 1,
            breaking_change_potential,
            suggested_tests: vec![],
            impact_summary: "1 changed file(s) affect 1 file(s) total".to_string(),
        }
    }

    #[test]
    fn structured_lists_every_affected_file() {
        let rendered = render_structured(&report());
        assert!(rendered.contains("a.py [HIGH]"));
        assert!(rendered.contains("b.py [LOW]"));
    }

    #[test]
    fn hierarchical_groups_by_level() {
        let rendered = render_hierarchical(&report());
        assert!(rendered.contains("## HIGH"));
        assert!(rendered.contains("## LOW"));
        assert!(!rendered.contains("## MEDIUM"));
    }
}

//! Function-call extraction and the caller→callee relation. Caller
//! attribution is simplistic by design: scan definitions
//! in the file and attribute each call to the enclosing definition by
//! line bracketing; unattributable calls are `"unknown"`. Nested
//! functions and lambdas are not specially handled — this is a
//! documented limitation of the original tool, not an oversight (see
//! DESIGN.md).

use rayon::prelude::*;
use repomap_core::types::{CodeTag, FunctionCall, TagKind, UNKNOWN_CALLER};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Threshold above which file-level call extraction is spread across a
/// worker pool.
pub const PARALLEL_THRESHOLD: usize = 10;

#[derive(Debug, Default, Clone)]
pub struct CallGraphBuildStats {
    pub files_processed: usize,
    pub failures: Vec<(PathBuf, String)>,
}

#[derive(Debug, Default, Clone)]
pub struct CallGraph {
    pub calls: Vec<FunctionCall>,
    pub function_locations: HashMap<String, PathBuf>,
}

impl CallGraph {
    pub fn callers_of(&self, callee: &str) -> Vec<&FunctionCall> {
        self.calls.iter().filter(|c| c.callee == callee).collect()
    }

    pub fn callees_of(&self, caller: &str) -> Vec<&FunctionCall> {
        self.calls.iter().filter(|c| c.caller == caller).collect()
    }
}

/// Build the per-file call list for one file given its tag sequence.
/// Caller attribution brackets each call's line against
/// `[definition.line, definition.end_line]` for every Definition/Method
/// tag, picking the tightest enclosing range.
pub fn extract_calls(file: &Path, tags: &[CodeTag]) -> Vec<FunctionCall> {
    let definitions: Vec<&CodeTag> = tags
        .iter()
        .filter(|t| matches!(t.kind, TagKind::Definition | TagKind::Method))
        .collect();

    tags.iter()
        .filter(|t| t.kind == TagKind::Call)
        .map(|call| {
            let caller = enclosing_definition(&definitions, call.line)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| UNKNOWN_CALLER.to_string());
            FunctionCall {
                caller,
                callee: call.name.clone(),
                file_path: file.to_path_buf(),
                line_number: call.line,
                is_method_call: false,
                object_name: None,
                resolved_callee_file: None,
            }
        })
        .collect()
}

fn enclosing_definition<'a>(definitions: &[&'a CodeTag], line: u32) -> Option<&'a CodeTag> {
    definitions
        .iter()
        .filter(|d| d.line <= line && d.end_line.map(|e| e >= line).unwrap_or(d.line == line))
        .min_by_key(|d| d.end_line.unwrap_or(d.line).saturating_sub(d.line))
        .copied()
}

/// Build the full project call graph from per-file tag sets. Files are
/// processed on a worker pool once the analyzable file count crosses
/// [`PARALLEL_THRESHOLD`]; the merge step itself is single-threaded.
/// Per-file failures are captured in the returned
/// stats and never abort the build.
pub fn build_call_graph(
    file_tags: &[(PathBuf, Vec<CodeTag>)],
) -> (CallGraph, CallGraphBuildStats) {
    let results: Vec<(PathBuf, Result<Vec<FunctionCall>, String>)> = if file_tags.len() > PARALLEL_THRESHOLD {
        file_tags
            .par_iter()
            .map(|(path, tags)| (path.clone(), Ok(extract_calls(path, tags))))
            .collect()
    } else {
        file_tags
            .iter()
            .map(|(path, tags)| (path.clone(), Ok(extract_calls(path, tags))))
            .collect()
    };

    let mut stats = CallGraphBuildStats::default();
    let mut all_calls = Vec::new();
    for (path, result) in results {
        stats.files_processed += 1;
        match result {
            Ok(calls) => all_calls.extend(calls),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "call extraction failed for file");
                stats.failures.push((path, e));
            }
        }
    }

    // Deterministic order: sort by (file, line) regardless of which
    // worker produced each record.
    all_calls.sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.line_number.cmp(&b.line_number)));

    let mut function_locations: HashMap<String, PathBuf> = HashMap::new();
    let mut ambiguous: HashMap<String, bool> = HashMap::new();
    for (path, tags) in file_tags {
        for tag in tags.iter().filter(|t| matches!(t.kind, TagKind::Definition | TagKind::Method)) {
            if let Some(existing) = function_locations.get(&tag.name) {
                if existing != path {
                    ambiguous.insert(tag.name.clone(), true);
                }
            } else {
                function_locations.insert(tag.name.clone(), path.clone());
            }
        }
    }
    for name in ambiguous.keys() {
        function_locations.remove(name);
    }

    for call in all_calls.iter_mut() {
        if let Some(file) = function_locations.get(&call.callee) {
            if file != &call.file_path {
                call.resolved_callee_file = Some(file.clone());
            }
        }
    }

    (
        CallGraph {
            calls: all_calls,
            function_locations,
        },
        stats,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_core::types::TagKind;

    fn def(name: &str, line: u32, end: u32) -> CodeTag {
        let mut t = CodeTag::new(name, TagKind::Definition, PathBuf::from("a.py"), line, 0);
        t.end_line = Some(end);
        t
    }
    fn call(name: &str, line: u32) -> CodeTag {
        CodeTag::new(name, TagKind::Call, PathBuf::from("a.py"), line, 0)
    }

    #[test]
    fn attributes_call_to_enclosing_definition() {
        let tags = vec![def("outer", 1, 10), call("helper", 5)];
        let calls = extract_calls(Path::new("a.py"), &tags);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].caller, "outer");
        assert_eq!(calls[0].callee, "helper");
    }

    #[test]
    fn unattributable_call_is_unknown() {
        let tags = vec![call("helper", 1)];
        let calls = extract_calls(Path::new("a.py"), &tags);
        assert_eq!(calls[0].caller, UNKNOWN_CALLER);
    }

    #[test]
    fn ambiguous_definitions_leave_callee_unresolved() {
        let a_tags = vec![def("helper", 1, 3)];
        let b_tags = vec![def("helper", 1, 3), call("helper", 2)];
        let file_tags = vec![
            (PathBuf::from("a.py"), a_tags),
            (PathBuf::from("b.py"), b_tags),
        ];
        let (graph, _stats) = build_call_graph(&file_tags);
        let call = graph.calls.iter().find(|c| c.callee == "helper").unwrap();
        assert!(call.resolved_callee_file.is_none());
    }
}

//! Per-language import extraction and resolution.
//!
//! Extraction turns the raw `import`-kind [`CodeTag`]s `TreeSitterParser`
//! already produced into structured [`Import`] records; resolution maps
//! each one onto a project file or marks it external. Both stages are
//! best-effort — a statement this module cannot parse is dropped, never
//! a hard error.

use repomap_core::types::{CodeTag, Import, ImportType, TagKind};
use repomap_core::Language;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const PY_STDLIB: &[&str] = &[
    "os", "sys", "re", "json", "math", "typing", "collections", "itertools", "functools",
    "pathlib", "subprocess", "logging", "dataclasses", "abc", "enum", "datetime", "asyncio",
    "unittest", "threading", "io", "copy", "uuid", "hashlib", "random", "shutil", "argparse",
];
const PY_THIRD_PARTY: &[&str] = &[
    "numpy", "pandas", "requests", "flask", "django", "pytest", "click", "pydantic", "sqlalchemy",
    "fastapi", "yaml", "boto3", "rich", "networkx",
];
const JS_STDLIB: &[&str] = &["fs", "path", "http", "https", "crypto", "os", "util", "events", "stream"];
const JS_THIRD_PARTY: &[&str] = &[
    "react", "express", "lodash", "axios", "vue", "next", "typescript", "jest", "webpack", "redux",
];
const JAVA_STDLIB_PREFIXES: &[&str] = &["java.", "javax."];
const GO_STDLIB: &[&str] = &["fmt", "os", "strings", "strconv", "net", "http", "context", "sync", "time", "io"];
const CS_STDLIB_PREFIXES: &[&str] = &["System"];

/// Extract [`Import`] records from a file's `import`-kind tags.
/// Resolution (`resolved_path`/`import_type`) is filled in separately by
/// [`resolve_imports`] once the full project file set is known.
pub fn extract_imports(language: &Language, tags: &[CodeTag]) -> Vec<Import> {
    tags.iter()
        .filter(|t| t.kind == TagKind::Import)
        .filter_map(|t| parse_import_statement(language, &t.name, t.line))
        .collect()
}

fn parse_import_statement(language: &Language, text: &str, line: u32) -> Option<Import> {
    let text = text.trim();
    match language {
        Language::Python => parse_python_import(text, line),
        Language::JavaScript | Language::JavaScriptJsx | Language::TypeScript | Language::TypeScriptJsx => {
            parse_js_import(text, line)
        }
        Language::Java => parse_java_import(text, line),
        Language::Go => parse_go_import(text, line),
        Language::CSharp => parse_csharp_import(text, line),
        Language::C | Language::Cpp => parse_c_include(text, line),
        Language::Other(_) => None,
    }
}

fn base_import(module: impl Into<String>, is_relative: bool, line: u32) -> Import {
    Import {
        module: module.into(),
        alias: None,
        symbols: Vec::new(),
        is_relative,
        import_type: ImportType::Absolute,
        line_number: line,
        resolved_path: None,
    }
}

fn parse_python_import(text: &str, line: u32) -> Option<Import> {
    if let Some(rest) = text.strip_prefix("from ") {
        let mut parts = rest.splitn(2, " import ");
        let module = parts.next()?.trim().to_string();
        let symbols_part = parts.next().unwrap_or("").trim();
        let symbols: Vec<String> = symbols_part
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let leading_dots = module.chars().take_while(|c| *c == '.').count();
        let mut import = base_import(module, leading_dots > 0, line);
        import.symbols = symbols;
        return Some(import);
    }
    if let Some(rest) = text.strip_prefix("import ") {
        let first = rest.split(',').next()?.trim();
        let (module, alias) = match first.split_once(" as ") {
            Some((m, a)) => (m.trim().to_string(), Some(a.trim().to_string())),
            None => (first.to_string(), None),
        };
        let mut import = base_import(module, false, line);
        import.alias = alias;
        return Some(import);
    }
    None
}

fn parse_js_import(text: &str, line: u32) -> Option<Import> {
    let start = text.find(['\'', '"'])?;
    let quote = text.as_bytes()[start] as char;
    let rest = &text[start + 1..];
    let end = rest.find(quote)?;
    let module = rest[..end].to_string();
    let is_relative = module.starts_with('.');
    let mut import = base_import(module, is_relative, line);

    if let Some(symbols_part) = text.find('{').and_then(|s| text.find('}').map(|e| &text[s + 1..e])) {
        import.symbols = symbols_part
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    } else if text.contains("import ") {
        if let Some(name) = text.trim_start_matches("import ").split_whitespace().next() {
            if name != "{" && !name.starts_with('\'') && !name.starts_with('"') {
                import.symbols = vec![name.to_string()];
            }
        }
    }
    Some(import)
}

fn parse_java_import(text: &str, line: u32) -> Option<Import> {
    let rest = text.strip_prefix("import ")?.trim_end_matches(';').trim();
    let rest = rest.strip_prefix("static ").unwrap_or(rest);
    Some(base_import(rest.to_string(), false, line))
}

fn parse_go_import(text: &str, line: u32) -> Option<Import> {
    let quoted = text.find('"')?;
    let rest = &text[quoted + 1..];
    let end = rest.find('"')?;
    Some(base_import(rest[..end].to_string(), false, line))
}

fn parse_csharp_import(text: &str, line: u32) -> Option<Import> {
    let rest = text.strip_prefix("using ")?.trim_end_matches(';').trim();
    Some(base_import(rest.to_string(), false, line))
}

fn parse_c_include(text: &str, line: u32) -> Option<Import> {
    let rest = text.strip_prefix("#include")?.trim();
    if let Some(inner) = rest.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Some(base_import(inner.to_string(), true, line));
    }
    if let Some(inner) = rest.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let mut import = base_import(inner.to_string(), false, line);
        import.import_type = ImportType::Standard;
        return Some(import);
    }
    None
}

/// Resolve each import against the project's analyzable file set.
/// Resolution never fails hard: an import this function
/// cannot place is left with `resolved_path = None` and
/// `import_type = External`.
pub fn resolve_imports(
    project_root: &Path,
    file: &Path,
    imports: Vec<Import>,
    language: &Language,
    project_files: &HashSet<PathBuf>,
) -> Vec<Import> {
    imports
        .into_iter()
        .map(|mut import| {
            if import.is_relative {
                resolve_relative(project_root, file, &mut import, language, project_files);
            } else {
                resolve_absolute(project_root, file, &mut import, language, project_files);
            }
            import
        })
        .collect()
}

fn candidate_extensions(language: &Language) -> &'static [&'static str] {
    match language {
        Language::Python => &["py"],
        Language::JavaScript | Language::JavaScriptJsx => &["js", "jsx", "mjs"],
        Language::TypeScript | Language::TypeScriptJsx => &["ts", "tsx", "js"],
        Language::Java => &["java"],
        Language::Go => &["go"],
        Language::CSharp => &["cs"],
        Language::C => &["c", "h"],
        Language::Cpp => &["cpp", "cc", "hpp", "h"],
        Language::Other(_) => &[],
    }
}

fn probe(base: &Path, language: &Language, project_files: &HashSet<PathBuf>) -> Option<PathBuf> {
    for ext in candidate_extensions(language) {
        let candidate = base.with_extension(ext);
        if let Ok(canon) = candidate.canonicalize() {
            if project_files.contains(&canon) {
                return Some(canon);
            }
        }
        if project_files.contains(&candidate) {
            return Some(candidate);
        }
    }
    // Package-index conventions: __init__.py / index.ts / index.js.
    for index_name in ["__init__", "index"] {
        for ext in candidate_extensions(language) {
            let candidate = base.join(format!("{index_name}.{ext}"));
            if let Ok(canon) = candidate.canonicalize() {
                if project_files.contains(&canon) {
                    return Some(canon);
                }
            }
            if project_files.contains(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn resolve_relative(
    project_root: &Path,
    file: &Path,
    import: &mut Import,
    language: &Language,
    project_files: &HashSet<PathBuf>,
) {
    let dir = file.parent().unwrap_or(project_root);
    let module = import.module.trim_start_matches('.');
    let leading_dots = import.module.chars().take_while(|c| *c == '.').count().max(1);

    let mut base = dir.to_path_buf();
    for _ in 1..leading_dots {
        base = base.parent().map(|p| p.to_path_buf()).unwrap_or(base);
    }
    if !module.is_empty() {
        for segment in module.split(['.', '/']) {
            if !segment.is_empty() {
                base = base.join(segment);
            }
        }
    }

    if let Some(path) = probe(&base, language, project_files) {
        import.resolved_path = Some(path);
        import.import_type = ImportType::Relative;
    } else {
        debug!(module = %import.module, file = %file.display(), "relative import did not resolve");
        import.import_type = ImportType::External;
    }
}

fn resolve_absolute(
    project_root: &Path,
    file: &Path,
    import: &mut Import,
    language: &Language,
    project_files: &HashSet<PathBuf>,
) {
    let module_path_parts: Vec<&str> = import.module.split(['.', '/']).collect();

    // (a) project-relative source root lookup.
    let from_root = project_root.join(module_path_parts.join("/"));
    if let Some(path) = probe(&from_root, language, project_files) {
        import.resolved_path = Some(path);
        import.import_type = ImportType::Absolute;
        return;
    }

    // (b) relative to the current file's directory.
    if let Some(dir) = file.parent() {
        let from_dir = dir.join(module_path_parts.join("/"));
        if let Some(path) = probe(&from_dir, language, project_files) {
            import.resolved_path = Some(path);
            import.import_type = ImportType::Absolute;
            return;
        }
    }

    // (c) known external-library set, else fall back to external anyway:
    // an absolute import this module can't place inside the project is
    // external by construction.
    let top_level = module_path_parts.first().copied().unwrap_or(&import.module);
    if is_known_external(language, top_level) {
        import.import_type = ImportType::ThirdParty;
    } else if matches!(import.import_type, ImportType::Standard) {
        // already marked Standard by the include-bracket heuristic.
    } else {
        import.import_type = ImportType::External;
    }
    import.resolved_path = None;
}

fn is_known_external(language: &Language, top_level: &str) -> bool {
    match language {
        Language::Python => PY_STDLIB.contains(&top_level) || PY_THIRD_PARTY.contains(&top_level),
        Language::JavaScript | Language::JavaScriptJsx | Language::TypeScript | Language::TypeScriptJsx => {
            JS_STDLIB.contains(&top_level) || JS_THIRD_PARTY.contains(&top_level)
        }
        Language::Java => JAVA_STDLIB_PREFIXES.iter().any(|p| top_level.starts_with(p)),
        Language::Go => GO_STDLIB.contains(&top_level),
        Language::CSharp => CS_STDLIB_PREFIXES.iter().any(|p| top_level.starts_with(p)),
        _ => false,
    }
}

/// An import whose resolved path falls outside `project_root` is
/// external even though it resolved to a real file on disk.
pub fn mark_outside_root_external(project_root: &Path, imports: &mut [Import]) {
    for import in imports.iter_mut() {
        if let Some(path) = &import.resolved_path {
            if !path.starts_with(project_root) {
                import.resolved_path = None;
                import.import_type = ImportType::External;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_python_from_import_with_symbols() {
        let import = parse_python_import("from pkg.mod import a, b", 3).unwrap();
        assert_eq!(import.module, "pkg.mod");
        assert_eq!(import.symbols, vec!["a", "b"]);
        assert!(!import.is_relative);
    }

    #[test]
    fn parses_python_relative_import() {
        let import = parse_python_import("from ..utils import helper", 1).unwrap();
        assert!(import.is_relative);
        assert_eq!(import.module, "..utils");
    }

    #[test]
    fn parses_js_default_import() {
        let import = parse_js_import("import foo from './foo'", 1).unwrap();
        assert_eq!(import.module, "./foo");
        assert!(import.is_relative);
    }

    #[test]
    fn marks_known_stdlib_external() {
        assert!(is_known_external(&Language::Python, "os"));
        assert!(!is_known_external(&Language::Python, "mypkg"));
    }
}

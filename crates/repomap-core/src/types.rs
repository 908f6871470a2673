use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Language classification recognized by the parser and file-discovery
/// filters. `Other` carries the raw extension for languages nobody has
/// written an extractor for yet; such files still flow through
/// `FileDiscovery` but `TreeSitterParser` yields `[]` for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    TypeScript,
    TypeScriptJsx,
    JavaScript,
    JavaScriptJsx,
    Java,
    Go,
    CSharp,
    C,
    Cpp,
    Other(String),
}

impl Language {
    /// Classify by file extension, matching the recognized extension set
    /// below.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext {
            "py" => Language::Python,
            "ts" => Language::TypeScript,
            "tsx" => Language::TypeScriptJsx,
            "js" | "mjs" | "cjs" => Language::JavaScript,
            "jsx" => Language::JavaScriptJsx,
            "java" => Language::Java,
            "go" => Language::Go,
            "cs" => Language::CSharp,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" => Language::Cpp,
            _ => return None,
        })
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }
}

/// Normalized kind of a [`CodeTag`]. Every per-language extractor maps its
/// own grammar node kinds down to this language-agnostic set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagKind {
    Definition,
    Reference,
    Call,
    Class,
    Method,
    Variable,
    Import,
    Other,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Definition => "definition",
            TagKind::Reference => "reference",
            TagKind::Call => "call",
            TagKind::Class => "class",
            TagKind::Method => "method",
            TagKind::Variable => "variable",
            TagKind::Import => "import",
            TagKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "definition" => TagKind::Definition,
            "reference" => TagKind::Reference,
            "call" => TagKind::Call,
            "class" => TagKind::Class,
            "method" => TagKind::Method,
            "variable" => TagKind::Variable,
            "import" => TagKind::Import,
            _ => TagKind::Other,
        }
    }
}

/// One extracted entity. Two tags are equal iff `(name, kind, file, line,
/// column)` match — `comment`/`end_line`/`end_column` do not
/// participate in identity because they can legitimately differ between
/// two extraction passes over the same definition (e.g. a trailing
/// docstring capture) without the tag itself changing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeTag {
    pub name: String,
    pub kind: TagKind,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
    pub comment: Option<String>,
}

impl PartialEq for CodeTag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.file == other.file
            && self.line == other.line
            && self.column == other.column
    }
}
impl Eq for CodeTag {}

impl CodeTag {
    pub fn new(name: impl Into<String>, kind: TagKind, file: PathBuf, line: u32, column: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            file,
            line,
            column,
            end_line: None,
            end_column: None,
            comment: None,
        }
    }
}

/// The tags extracted from one file, plus the cache key material
/// (content hash, mtime) captured at parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTags {
    pub file: PathBuf,
    pub tags: Vec<CodeTag>,
    pub content_hash: String,
    pub mtime: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportType {
    Absolute,
    Relative,
    External,
    Standard,
    ThirdParty,
}

/// A resolved import record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub module: String,
    pub alias: Option<String>,
    pub symbols: Vec<String>,
    pub is_relative: bool,
    pub import_type: ImportType,
    pub line_number: u32,
    pub resolved_path: Option<PathBuf>,
}

impl Import {
    pub fn is_external(&self) -> bool {
        matches!(self.import_type, ImportType::External)
    }
}

/// A call-site record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub caller: String,
    pub callee: String,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub is_method_call: bool,
    pub object_name: Option<String>,
    pub resolved_callee_file: Option<PathBuf>,
}

pub const UNKNOWN_CALLER: &str = "unknown";

/// Breaking-change severity class for one file in an [`ImpactReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakingChangeLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl BreakingChangeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakingChangeLevel::Low => "LOW",
            BreakingChangeLevel::Medium => "MEDIUM",
            BreakingChangeLevel::High => "HIGH",
            BreakingChangeLevel::Unknown => "UNKNOWN",
        }
    }
}

/// A ranked identifier match. Scores are integers in `[0, 100]` so that
/// matchers with different internal score domains can be compared
/// uniformly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub identifier: String,
    pub score: u32,
}

impl Match {
    pub fn new(identifier: impl Into<String>, score_0_1: f64) -> Self {
        let score = (score_0_1.clamp(0.0, 1.0) * 100.0).round() as u32;
        Self {
            identifier: identifier.into(),
            score,
        }
    }

    pub fn from_score_100(identifier: impl Into<String>, score: u32) -> Self {
        Self {
            identifier: identifier.into(),
            score: score.min(100),
        }
    }
}

/// Sort matches by descending score, ties broken by identifier for
/// determinism.
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.identifier.cmp(&b.identifier)));
}

//! Shared helpers for per-language tag extractors: tree-sitter node text,
//! 1-based line/column computation, and tag construction. Each
//! language's walker owns its own tree traversal (grammars differ too
//! much for a single generic walker to stay readable) but all of them
//! go through these helpers so tag shape stays uniform.

use repomap_core::types::{CodeTag, TagKind};
use std::path::{Path, PathBuf};
use tree_sitter::Node;

pub struct TagBuilder<'a> {
    content: &'a [u8],
    file: PathBuf,
}

impl<'a> TagBuilder<'a> {
    pub fn new(content: &'a str, file: &Path) -> Self {
        Self {
            content: content.as_bytes(),
            file: file.to_path_buf(),
        }
    }

    pub fn text(&self, node: &Node) -> String {
        node.utf8_text(self.content).unwrap_or("").to_string()
    }

    pub fn tag(&self, name: impl Into<String>, kind: TagKind, node: &Node) -> CodeTag {
        let start = node.start_position();
        let end = node.end_position();
        CodeTag {
            name: name.into(),
            kind,
            file: self.file.clone(),
            line: start.row as u32 + 1,
            column: start.column as u32 + 1,
            end_line: Some(end.row as u32 + 1),
            end_column: Some(end.column as u32 + 1),
            comment: None,
        }
    }
}

/// Depth-first pre-order traversal helper: calls `visit` on every node,
/// which returns `true` to keep descending into its children.
pub fn walk<'a>(node: Node<'a>, visit: &mut impl FnMut(Node<'a>) -> bool) {
    if !visit(node) {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, visit);
    }
}

/// Find the first direct child with one of the given grammar kinds.
pub fn child_of_kind<'a>(node: &Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| kinds.contains(&c.kind()));
    found
}

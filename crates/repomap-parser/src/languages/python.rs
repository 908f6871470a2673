use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

pub struct PythonExtractor;

impl LanguageExtractor for PythonExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk_node(tree.root_node(), &builder, false, &mut tags);
        tags
    }
}

fn walk_node(node: Node, builder: &TagBuilder, in_class: bool, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "function_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let kind = if in_class { TagKind::Method } else { TagKind::Definition };
                tags.push(builder.tag(builder.text(&name_node), kind, &node));
            }
            // A method's own body is not "in a class" for nested defs.
            walk_children(node, builder, false, tags);
            return;
        }
        "class_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name_node), TagKind::Class, &node));
            }
            walk_children(node, builder, true, tags);
            return;
        }
        "call" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                let callee_name = match function_node.kind() {
                    "attribute" => function_node
                        .child_by_field_name("attribute")
                        .map(|n| builder.text(&n)),
                    "identifier" => Some(builder.text(&function_node)),
                    _ => None,
                };
                if let Some(name) = callee_name {
                    tags.push(builder.tag(name, TagKind::Call, &node));
                }
            }
        }
        "import_statement" | "import_from_statement" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "assignment" => {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    tags.push(builder.tag(builder.text(&left), TagKind::Variable, &node));
                }
            }
        }
        "identifier" => {
            // Bare identifier references not already captured as a more
            // specific kind above (definitions/calls/imports consume
            // their own identifier children directly).
            if !matches!(
                node.parent().map(|p| p.kind()),
                Some(
                    "function_definition"
                        | "class_definition"
                        | "call"
                        | "assignment"
                        | "import_statement"
                        | "import_from_statement"
                        | "keyword_argument"
                        | "attribute"
                )
            ) {
                tags.push(builder.tag(builder.text(&node), TagKind::Reference, &node));
            }
        }
        _ => {}
    }
    walk_children(node, builder, in_class, tags);
}

fn walk_children(node: Node, builder: &TagBuilder, in_class: bool, tags: &mut Vec<CodeTag>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_node(child, builder, in_class, tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_core::types::TagKind;
    use std::path::PathBuf;
    use tree_sitter::Parser;

    fn parse(src: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn extracts_top_level_function_definition() {
        let tree = parse("def f(): pass\n");
        let tags = PythonExtractor.extract(&tree, "def f(): pass\n", &PathBuf::from("foo.py"));
        let defs: Vec<_> = tags
            .iter()
            .filter(|t| t.kind == TagKind::Definition && t.name == "f")
            .collect();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].line, 1);
    }

    #[test]
    fn class_methods_are_tagged_method_not_definition() {
        let src = "class C:\n    def m(self):\n        pass\n";
        let tree = parse(src);
        let tags = PythonExtractor.extract(&tree, src, &PathBuf::from("foo.py"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Class && t.name == "C"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Method && t.name == "m"));
    }

    #[test]
    fn extracts_calls_and_imports() {
        let src = "import os\nfrom sys import path\n\ndef f():\n    os.getcwd()\n    g()\n";
        let tree = parse(src);
        let tags = PythonExtractor.extract(&tree, src, &PathBuf::from("foo.py"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Import));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "getcwd"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "g"));
    }

    #[test]
    fn empty_file_yields_no_tags() {
        let tree = parse("");
        let tags = PythonExtractor.extract(&tree, "", &PathBuf::from("empty.py"));
        assert!(tags.is_empty());
    }
}

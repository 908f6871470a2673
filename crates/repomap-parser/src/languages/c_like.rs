use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

/// Shared walker for C and C++; the latter's class/struct/namespace
/// nodes are a strict superset of the former's.
pub struct CLikeExtractor;

impl LanguageExtractor for CLikeExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk(tree.root_node(), &builder, &mut tags);
        tags
    }
}

fn function_name(declarator: Node, builder: &TagBuilder) -> Option<String> {
    match declarator.kind() {
        "function_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(|d| function_name(d, builder)),
        "identifier" | "field_identifier" | "qualified_identifier" => Some(builder.text(&declarator)),
        "pointer_declarator" | "reference_declarator" => declarator
            .child_by_field_name("declarator")
            .and_then(|d| function_name(d, builder)),
        _ => None,
    }
}

fn walk(node: Node, builder: &TagBuilder, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "function_definition" => {
            if let Some(declarator) = node.child_by_field_name("declarator") {
                if let Some(name) = function_name(declarator, builder) {
                    tags.push(builder.tag(name, TagKind::Definition, &node));
                }
            }
        }
        "class_specifier" | "struct_specifier" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Class, &node));
            }
        }
        "preproc_include" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "call_expression" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                let callee_name = match function_node.kind() {
                    "field_expression" => function_node
                        .child_by_field_name("field")
                        .map(|n| builder.text(&n)),
                    "identifier" => Some(builder.text(&function_node)),
                    _ => None,
                };
                if let Some(name) = callee_name {
                    tags.push(builder.tag(name, TagKind::Call, &node));
                }
            }
        }
        "init_declarator" => {
            if let Some(declarator) = node.child_by_field_name("declarator") {
                if let Some(name) = function_name(declarator, builder) {
                    tags.push(builder.tag(name, TagKind::Variable, &node));
                }
            }
        }
        _ => {}
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, builder, tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomap_core::types::TagKind;
    use std::path::PathBuf;
    use tree_sitter::Parser;

    #[test]
    fn extracts_function_definition_and_call() {
        let src = "#include <stdio.h>\n\nint main() {\n  printf(\"hi\");\n  return 0;\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c::LANGUAGE.into()).unwrap();
        let tree = parser.parse(src, None).unwrap();
        let tags = CLikeExtractor.extract(&tree, src, &PathBuf::from("main.c"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Definition && t.name == "main"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "printf"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Import));
    }
}

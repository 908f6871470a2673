use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

pub struct GoExtractor;

impl LanguageExtractor for GoExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk(tree.root_node(), &builder, &mut tags);
        tags
    }
}

fn walk(node: Node, builder: &TagBuilder, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "function_declaration" | "method_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Definition, &node));
            }
        }
        "type_spec" => {
            if let Some(name) = node.child_by_field_name("name") {
                if node
                    .child_by_field_name("type")
                    .map(|t| t.kind() == "struct_type" || t.kind() == "interface_type")
                    .unwrap_or(false)
                {
                    tags.push(builder.tag(builder.text(&name), TagKind::Class, &node));
                }
            }
        }
        "import_spec" | "import_declaration" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "call_expression" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                let callee_name = match function_node.kind() {
                    "selector_expression" => function_node
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
        "var_spec" | "short_var_declaration" => {
            if let Some(name) = node.child_by_field_name("left").or_else(|| node.child_by_field_name("name")) {
                tags.push(builder.tag(builder.text(&name), TagKind::Variable, &node));
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
    fn extracts_function_and_call() {
        let src = "package main\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into()).unwrap();
        let tree = parser.parse(src, None).unwrap();
        let tags = GoExtractor.extract(&tree, src, &PathBuf::from("main.go"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Definition && t.name == "main"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "Println"));
    }
}

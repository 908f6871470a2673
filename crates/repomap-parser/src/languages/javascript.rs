use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

/// Shared walker for JavaScript, JSX, TypeScript, and TSX — the four
/// grammars diverge mostly in type-annotation nodes this extractor does
/// not need to look at.
pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk_node(tree.root_node(), &builder, false, &mut tags);
        tags
    }
}

fn walk_node(node: Node, builder: &TagBuilder, in_class: bool, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Definition, &node));
            }
            walk_children(node, builder, false, tags);
            return;
        }
        "method_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Method, &node));
            }
            walk_children(node, builder, false, tags);
            return;
        }
        "class_declaration" | "class" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Class, &node));
            }
            walk_children(node, builder, true, tags);
            return;
        }
        "call_expression" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                let callee_name = match function_node.kind() {
                    "member_expression" => function_node
                        .child_by_field_name("property")
                        .map(|n| builder.text(&n)),
                    "identifier" => Some(builder.text(&function_node)),
                    _ => None,
                };
                if let Some(name) = callee_name {
                    tags.push(builder.tag(name, TagKind::Call, &node));
                }
            }
        }
        "import_statement" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "variable_declarator" => {
            if let Some(name) = node.child_by_field_name("name") {
                if name.kind() == "identifier" {
                    tags.push(builder.tag(builder.text(&name), TagKind::Variable, &node));
                }
            }
        }
        "identifier" => {
            if !matches!(
                node.parent().map(|p| p.kind()),
                Some(
                    "function_declaration"
                        | "generator_function_declaration"
                        | "method_definition"
                        | "class_declaration"
                        | "class"
                        | "call_expression"
                        | "variable_declarator"
                        | "import_statement"
                        | "member_expression"
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
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        parser.parse(src, None).unwrap()
    }

    #[test]
    fn extracts_function_and_call() {
        let src = "function greet(name) {\n  console.log(name);\n}\n";
        let tree = parse(src);
        let tags = JavaScriptExtractor.extract(&tree, src, &PathBuf::from("a.js"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Definition && t.name == "greet"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "log"));
    }

    #[test]
    fn extracts_class_and_method() {
        let src = "class Foo {\n  bar() {}\n}\n";
        let tree = parse(src);
        let tags = JavaScriptExtractor.extract(&tree, src, &PathBuf::from("a.js"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Class && t.name == "Foo"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Method && t.name == "bar"));
    }
}

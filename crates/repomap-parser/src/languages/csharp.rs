use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

pub struct CSharpExtractor;

impl LanguageExtractor for CSharpExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk(tree.root_node(), &builder, &mut tags);
        tags
    }
}

fn walk(node: Node, builder: &TagBuilder, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "class_declaration" | "interface_declaration" | "struct_declaration" | "enum_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Class, &node));
            }
        }
        "method_declaration" | "constructor_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Method, &node));
            }
        }
        "using_directive" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "invocation_expression" => {
            if let Some(function_node) = node.child_by_field_name("function") {
                let callee_name = match function_node.kind() {
                    "member_access_expression" => function_node
                        .child_by_field_name("name")
                        .map(|n| builder.text(&n)),
                    "identifier" => Some(builder.text(&function_node)),
                    _ => None,
                };
                if let Some(name) = callee_name {
                    tags.push(builder.tag(name, TagKind::Call, &node));
                }
            }
        }
        "variable_declarator" => {
            if let Some(name) = node.child_by_field_name("name") {
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
    fn extracts_class_and_method() {
        let src = "class Foo {\n  void Bar() {\n    Console.WriteLine(\"hi\");\n  }\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into()).unwrap();
        let tree = parser.parse(src, None).unwrap();
        let tags = CSharpExtractor.extract(&tree, src, &PathBuf::from("Foo.cs"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Class && t.name == "Foo"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Method && t.name == "Bar"));
    }
}

use super::support::TagBuilder;
use super::LanguageExtractor;
use repomap_core::types::{CodeTag, TagKind};
use std::path::Path;
use tree_sitter::Node;

pub struct JavaExtractor;

impl LanguageExtractor for JavaExtractor {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag> {
        let builder = TagBuilder::new(content, file);
        let mut tags = Vec::new();
        walk(tree.root_node(), &builder, &mut tags);
        tags
    }
}

fn walk(node: Node, builder: &TagBuilder, tags: &mut Vec<CodeTag>) {
    match node.kind() {
        "class_declaration" | "interface_declaration" | "enum_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Class, &node));
            }
        }
        "method_declaration" | "constructor_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Method, &node));
            }
        }
        "import_declaration" => {
            tags.push(builder.tag(builder.text(&node), TagKind::Import, &node));
        }
        "method_invocation" => {
            if let Some(name) = node.child_by_field_name("name") {
                tags.push(builder.tag(builder.text(&name), TagKind::Call, &node));
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
    fn extracts_class_method_and_call() {
        let src = "class Foo {\n  void bar() {\n    System.out.println(\"hi\");\n  }\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into()).unwrap();
        let tree = parser.parse(src, None).unwrap();
        let tags = JavaExtractor.extract(&tree, src, &PathBuf::from("Foo.java"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Class && t.name == "Foo"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Method && t.name == "bar"));
        assert!(tags.iter().any(|t| t.kind == TagKind::Call && t.name == "println"));
    }
}

pub mod c_like;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod python;
pub mod support;

use repomap_core::types::CodeTag;
use repomap_core::Language;
use std::path::Path;

/// Walk a parsed tree-sitter tree and emit a normalized tag sequence for
/// one language. Implementations never raise; an unrecognized or empty
/// tree simply yields `[]`.
pub trait LanguageExtractor: Send + Sync {
    fn extract(&self, tree: &tree_sitter::Tree, content: &str, file: &Path) -> Vec<CodeTag>;
}

pub fn extractor_for(language: &Language) -> Option<Box<dyn LanguageExtractor>> {
    match language {
        Language::Python => Some(Box::new(python::PythonExtractor)),
        Language::JavaScript | Language::JavaScriptJsx | Language::TypeScript | Language::TypeScriptJsx => {
            Some(Box::new(javascript::JavaScriptExtractor))
        }
        Language::Java => Some(Box::new(java::JavaExtractor)),
        Language::Go => Some(Box::new(go::GoExtractor)),
        Language::CSharp => Some(Box::new(csharp::CSharpExtractor)),
        Language::C | Language::Cpp => Some(Box::new(c_like::CLikeExtractor)),
        Language::Other(_) => None,
    }
}

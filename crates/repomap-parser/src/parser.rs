//! `TreeSitterParser`: the single entry point for turning a file into a
//! tag sequence, consulting [`TagCache`] first.

use crate::language::LanguageRegistry;
use crate::languages;
use crate::tag_cache::TagCache;
use repomap_core::config::RepomapConfig;
use repomap_core::types::CodeTag;
use repomap_core::Language;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use tree_sitter::Parser;

pub struct TreeSitterParser {
    registry: LanguageRegistry,
    cache: Option<Arc<TagCache>>,
}

impl TreeSitterParser {
    pub fn new(cache: Option<Arc<TagCache>>) -> Self {
        Self {
            registry: LanguageRegistry::new(),
            cache,
        }
    }

    pub fn language_for(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.registry.language_for_extension(ext)
    }

    /// Parse one file, returning its tags. Never raises for an
    /// unreadable-as-UTF-8 file, a file with no matches, or an
    /// unrecognized extension — each of those is simply `[]`.
    pub fn parse_file(&self, path: &Path) -> Vec<CodeTag> {
        let cache_enabled = RepomapConfig::cache_enabled();
        if cache_enabled {
            if let Some(cache) = &self.cache {
                match cache.get(path) {
                    Ok(Some(tags)) => {
                        debug!(file = %path.display(), "tag cache hit");
                        return tags;
                    }
                    Ok(None) => {}
                    Err(e) => warn!(file = %path.display(), error = %e, "tag cache read failed"),
                }
            }
        }

        let language = match self.language_for(path) {
            Some(l) => l,
            None => return Vec::new(),
        };
        let grammar = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.registry.grammar_for_extension(ext))
        {
            Some(g) => g,
            None => return Vec::new(),
        };

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "failed to read file");
                return Vec::new();
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => {
                warn!(file = %path.display(), "skipping file with malformed UTF-8");
                return Vec::new();
            }
        };

        let mut parser = Parser::new();
        if parser.set_language(&grammar).is_err() {
            warn!(file = %path.display(), "failed to configure grammar");
            return Vec::new();
        }
        let tree = match parser.parse(&content, None) {
            Some(t) => t,
            None => {
                warn!(file = %path.display(), "tree-sitter failed to parse file");
                return Vec::new();
            }
        };

        let tags = match languages::extractor_for(&language) {
            Some(extractor) => extractor.extract(&tree, &content, path),
            None => Vec::new(),
        };

        if cache_enabled {
            if let Some(cache) = &self.cache {
                if let Err(e) = cache.put(path, &tags) {
                    warn!(file = %path.display(), error = %e, "failed to write tag cache");
                }
            }
        }

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_extension_yields_empty() {
        let parser = TreeSitterParser::new(None);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();
        assert!(parser.parse_file(&file).is_empty());
    }

    #[test]
    fn empty_python_file_yields_empty() {
        let parser = TreeSitterParser::new(None);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.py");
        std::fs::write(&file, "").unwrap();
        assert!(parser.parse_file(&file).is_empty());
    }

    #[test]
    fn reparse_after_content_change_produces_new_tags() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(TagCache::in_memory().unwrap());
        let parser = TreeSitterParser::new(Some(cache));
        let file = dir.path().join("foo.py");

        std::fs::write(&file, "def f(): pass\n").unwrap();
        let first = parser.parse_file(&file);
        assert!(first.iter().any(|t| t.name == "f"));

        std::fs::write(&file, "def g(): pass\n").unwrap();
        let future = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        std::fs::File::open(&file).unwrap().set_modified(future).unwrap();

        let second = parser.parse_file(&file);
        assert!(second.iter().any(|t| t.name == "g"));
    }
}

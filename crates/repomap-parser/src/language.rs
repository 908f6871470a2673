// ABOUTME: Maps recognized file extensions to tree-sitter grammars.
// ABOUTME: The registry is the one process-wide singleton this crate keeps.
use repomap_core::Language;
use std::collections::HashMap;

pub struct LanguageConfig {
    pub grammar: tree_sitter::Language,
    pub extensions: &'static [&'static str],
}

pub struct LanguageRegistry {
    configs: HashMap<&'static str, (Language, tree_sitter::Language)>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        let mut insert = |exts: &'static [&'static str], lang: Language, grammar: tree_sitter::Language| {
            for ext in exts {
                configs.insert(*ext, (lang.clone(), grammar.clone()));
            }
        };

        insert(&["py"], Language::Python, tree_sitter_python::LANGUAGE.into());
        insert(
            &["ts"],
            Language::TypeScript,
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        );
        insert(
            &["tsx"],
            Language::TypeScriptJsx,
            tree_sitter_typescript::LANGUAGE_TSX.into(),
        );
        insert(
            &["js", "mjs", "cjs"],
            Language::JavaScript,
            tree_sitter_javascript::LANGUAGE.into(),
        );
        insert(
            &["jsx"],
            Language::JavaScriptJsx,
            tree_sitter_javascript::LANGUAGE.into(),
        );
        insert(&["java"], Language::Java, tree_sitter_java::LANGUAGE.into());
        insert(&["go"], Language::Go, tree_sitter_go::LANGUAGE.into());
        insert(&["cs"], Language::CSharp, tree_sitter_c_sharp::LANGUAGE.into());
        insert(&["c", "h"], Language::C, tree_sitter_c::LANGUAGE.into());
        insert(
            &["cpp", "cc", "cxx", "hpp", "hxx"],
            Language::Cpp,
            tree_sitter_cpp::LANGUAGE.into(),
        );

        Self { configs }
    }

    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        self.configs.get(ext).map(|(lang, _)| lang.clone())
    }

    pub fn grammar_for_extension(&self, ext: &str) -> Option<tree_sitter::Language> {
        self.configs.get(ext).map(|(_, grammar)| grammar.clone())
    }

    pub fn recognized_extensions(&self) -> Vec<&'static str> {
        self.configs.keys().copied().collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub static EXTENSIONS: &[&str] = &[
    "py", "ts", "tsx", "js", "jsx", "java", "go", "cs", "cpp", "c", "h", "hpp",
];

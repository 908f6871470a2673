//! Shared data model, error taxonomy, traits, and configuration for the
//! RepoMap analysis engine. Every other crate in the workspace depends
//! on this one and nothing here depends back on them.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    BreakingChangeLevel, CodeTag, FileTags, FunctionCall, Import, ImportType, Language, Match,
    TagKind, UNKNOWN_CALLER,
};

use thiserror::Error;

/// The crate-wide error taxonomy. Every component in the workspace either
/// returns one of these variants directly or wraps it behind a crate-local
/// alias; there is no separate error type per crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("file access error: {0}")]
    FileAccess(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tag extraction error: {0}")]
    TagExtraction(String),

    #[error("matcher error: {0}")]
    Matcher(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("project analysis error: {0}")]
    ProjectAnalysis(String),

    #[error("memory error: {0}")]
    Memory(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout error: {0}")]
    Timeout(String),

    #[error("parallel processing error: {0}")]
    ParallelProcessing(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

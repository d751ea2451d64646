//! Error types for ploclib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while measuring preprocessor expansion
#[derive(Error, Debug)]
pub enum PlocError {
    /// Failed to read the compilation database
    #[error("cannot read compilation database '{path}': {source}. Consult --help to get started.")]
    CompileCommandsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The compilation database is not valid JSON
    #[error("invalid compilation database '{path}': {source}")]
    CompileCommandsJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The build directory passed to --build-dir does not exist
    #[error("specified build dir '{0}' is not a directory")]
    BuildDirNotFound(PathBuf),

    /// A group named in --only is not defined
    #[error("specified report group '{0}' is not defined")]
    UnknownGroup(String),

    /// A group pattern failed to compile
    #[error("invalid group pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A compile command did not match the expected clang invocation shape
    #[error("compile command for '{file}' is not a recognizable clang invocation: {command}")]
    CommandShape { file: String, command: String },

    /// A counting pipeline produced something other than two integers
    #[error("expected two line counts for '{file}', got '{output}'")]
    CountOutput { file: String, output: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

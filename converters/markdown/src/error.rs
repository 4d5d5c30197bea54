//! Error types for the Markdown formatter.

use std::path::PathBuf;

/// Errors that can occur during Markdown formatting.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during formatting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Output path would be the same as input path.
    #[error("Output path cannot be the same as input path: {0}")]
    OutputPathSameAsInput(PathBuf),

    /// Parser error, including broken tree invariants met while formatting.
    #[error(transparent)]
    Parser(#[from] mdext_parser::Error),

    /// Formatter options could not be read.
    #[error("invalid formatter options: {0}")]
    Options(#[from] serde_json::Error),
}

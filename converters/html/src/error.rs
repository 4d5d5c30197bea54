use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),

    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {0}")]
    Parse(#[from] mdext_parser::Error),

    #[error("input file and output file cannot be the same: {0}")]
    OutputPathSameAsInput(PathBuf),

    #[error("template not found: {0}")]
    MissingTemplate(String),

    #[error("invalid HTML options: {0}")]
    Options(#[from] serde_json::Error),
}

//! Error types for cae-io

use std::io;
use std::path::PathBuf;

use cae_inp::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Fatal import failures. Recoverable report conditions are not errors;
/// they end up in [`cae_model::ReportDiagnostic`].
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("line {line}: missing parameter `{parameter}`")]
    MissingParameter { line: usize, parameter: String },

    #[error("line {line}: instance references undefined part `{name}`")]
    UndefinedPart { line: usize, name: String },

    #[error("no part named `{0}` in the geometry")]
    UnknownPart(String),

    #[error("line {line}: invalid number in `{content}`")]
    NumericFormat { line: usize, content: String },

    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("part `{0}` has no nodes")]
    DegeneratePart(String),

    #[error("cannot allocate {slots} {kind} slots")]
    Capacity { kind: &'static str, slots: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingParameter { line, parameter } => {
                ImportError::MissingParameter { line, parameter }
            }
            ParseError::NumericFormat { line, content } => {
                ImportError::NumericFormat { line, content }
            }
            ParseError::Format { line, message } => ImportError::Format { line, message },
        }
    }
}

impl ImportError {
    /// Maps `NotFound` to [`ImportError::FileNotFound`] so hosts can tell a
    /// bad path from a read failure.
    pub(crate) fn open(path: impl Into<PathBuf>, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            ImportError::FileNotFound(path.into())
        } else {
            ImportError::Io(err)
        }
    }
}

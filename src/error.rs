//! Error types for the listing -> tree -> export pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a single listing line could not be turned into an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },
    #[error("invalid size field '{0}'")]
    InvalidSize(String),
}

/// Everything that can abort a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A listing line did not split into the required fields, or its size was not a
    /// non-negative integer.
    #[error("malformed record on line {line_number}: {reason}: {line:?}")]
    MalformedRecord {
        line_number: usize,
        line: String,
        reason: RecordError,
    },

    /// A path was listed as a leaf and also used as a directory.
    #[error("conflicting entry: '{path}' is listed both as a file and as a directory")]
    ConflictingEntry { path: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archiving program could not produce an index file.
    #[error("{program}: {reason}")]
    Archiver { program: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

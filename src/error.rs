//! Typed failures surfaced by the grouping library.
//!
//! Callers that only need a message can bubble these through `anyhow`; callers
//! that branch on the outcome (for example "no such group" versus "group has no
//! handler") match on the variant.

use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GrouperError>;

#[derive(Error, Debug)]
pub enum GrouperError {
    #[error("Threshold must be between 0.0 and 1.0 (got {0})")]
    InvalidThreshold(f64),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("No processor registered for group: {0}")]
    MissingProcessor(String),

    #[error("Processor for group '{group}' failed: {source}")]
    ProcessorFailed {
        group: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Empty CSV file: {0:?}")]
    EmptyFile(PathBuf),

    #[error("Malformed groupings document: {0}")]
    MalformedDocument(String),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    #[error("Failed to decode text with encoding {0}")]
    Decode(&'static str),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to encode groupings: {0}")]
    Encode(String),
}

impl GrouperError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GrouperError::Io {
            path: path.into(),
            source,
        }
    }
}

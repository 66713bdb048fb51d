use miniflow_core::MiniflowError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or training on tabular data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Line {line}: cannot parse {token:?} as a number")]
    Parse { line: usize, token: String },

    #[error("Line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Graph(#[from] MiniflowError),
}

//! Error types for dataset loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading a dataset file. Row-level problems are not errors;
/// they are counted in [`super::LoadReport`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV header of {path}")]
    CsvHeader {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("failed to parse manifest {path}")]
    ParseManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

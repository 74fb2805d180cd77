//! Error types for the data-loader crate.
//!
//! Invalid ratings are not errors: the parser drops those rows silently.
//! Everything here is a failure to read the source at all.

use thiserror::Error;

/// Errors that can occur while loading a ratings file
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found, opened or inspected
    #[error("Failed to access file {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The header row lacks one of the required columns
    #[error("Missing required column `{column}` in {path}")]
    MissingColumn { column: String, path: String },

    /// The CSV stream itself is malformed (bad quoting, invalid UTF-8, ...)
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl DataLoadError {
    pub(crate) fn file_access(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

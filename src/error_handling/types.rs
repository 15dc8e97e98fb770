//! Error type definitions.
//!
//! This module defines the error types returned at the crate's public seams.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failures of a categorization or prediction call.
///
/// A call either returns a batch carrying every derived column or one of these
/// errors; a batch is never partially annotated. Per-row misses are not errors:
/// they show up as null categories in an otherwise successful result.
#[derive(Error, Debug)]
pub enum CategoryError {
    /// The requested domain column is not present in the batch.
    #[error("Column `{0}` not found in the row batch")]
    MissingColumn(String),

    /// A reference table or model artifact could not be obtained locally or remotely.
    #[error("Data unavailable for {artifact}: {source}")]
    DataUnavailable {
        /// Name of the artifact that could not be loaded (e.g. `dmoz_2016.csv.bz2`)
        artifact: String,
        /// Underlying fetch or parse failure
        #[source]
        source: anyhow::Error,
    },

    /// Unexpected failure while joining or merging derived columns.
    #[error("Resolution error: {0}")]
    ResolutionError(#[source] anyhow::Error),
}

impl CategoryError {
    /// Builds a `DataUnavailable` error for the named artifact.
    pub(crate) fn unavailable(artifact: impl Into<String>, source: anyhow::Error) -> Self {
        CategoryError::DataUnavailable {
            artifact: artifact.into(),
            source,
        }
    }

    /// Returns true when the caller can keep its original batch and carry on.
    ///
    /// Only missing data is recoverable; a missing column or a failed merge
    /// points at a problem with the input itself.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CategoryError::DataUnavailable { .. })
    }
}

/// Errors raised by the row container (`Frame`).
#[derive(Error, Debug)]
pub enum FrameError {
    /// A column does not have one value per row.
    #[error("Column `{column}` has {actual} values, expected {expected}")]
    LengthMismatch {
        /// Offending column name
        column: String,
        /// Number of rows in the frame
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// A column with this name already exists.
    #[error("Column `{0}` already exists")]
    DuplicateColumn(String),

    /// CSV read or write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failure while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

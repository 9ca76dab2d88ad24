//! Error types for grid decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for decoder operations.
pub type GrdResult<T> = Result<T, GrdError>;

/// Errors raised while decoding a grid.
#[derive(Error, Debug)]
pub enum GrdError {
    /// Payload is not a whole number of days for the parameter.
    #[error("truncated grid: {actual} bytes is not a non-zero multiple of {expected}")]
    TruncatedGrid { actual: usize, expected: usize },

    /// A multi-day decode was requested with no input files.
    #[error("no grid files to concatenate")]
    EmptyRange,

    /// Grids of different parameters or shapes cannot share a time axis.
    #[error("cannot stack a {actual} grid onto a {expected} grid")]
    StackMismatch { expected: String, actual: String },

    /// Number of dates does not match the time axis.
    #[error("expected {expected} dates for the time axis, got {actual}")]
    DateCountMismatch { expected: usize, actual: usize },

    /// Reading a grid file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GrdError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if the error points at bad file content rather than access.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::TruncatedGrid { .. })
    }
}

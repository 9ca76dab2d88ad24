//! Error types for request validation.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using ImdError.
pub type ImdResult<T> = Result<T, ImdError>;

/// Validation errors raised before any I/O takes place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImdError {
    #[error("{id} is not available in IMD, expected one of {valid:?}")]
    UnknownParameter { id: String, valid: Vec<&'static str> },

    #[error("Start date is required")]
    MissingStartDate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("{parameter} data available after {earliest}")]
    DataUnavailable {
        parameter: &'static str,
        earliest: NaiveDate,
    },

    #[error("{0} does not exist or is not a directory")]
    InvalidPath(String),
}

impl ImdError {
    /// True for errors caused by malformed caller input (as opposed to
    /// requests that are well formed but cannot be served).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImdError::UnknownParameter { .. }
                | ImdError::MissingStartDate
                | ImdError::InvalidDateFormat(_)
        )
    }
}

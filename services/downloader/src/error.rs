//! Error types for the downloader.

use std::path::{Path, PathBuf};

use grid_writer::WriterError;
use imd_common::ImdError;
use thiserror::Error;

/// Errors that stop a download or conversion session.
///
/// Problems with individual days are not errors; they are recorded as
/// outcomes in the session result.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Bad parameter, dates or path.
    #[error(transparent)]
    Input(#[from] ImdError),

    /// No requested day could be made available locally.
    #[error("{parameter} data unavailable or inaccessible")]
    AllDownloadsUnavailable { parameter: &'static str },

    /// Failed to set up the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Conversion could not start.
    #[error(transparent)]
    Writer(#[from] WriterError),

    /// Invalid configuration file or values.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for errors caused by the request rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(self, DownloadError::Input(e) if e.is_input_error())
    }
}

/// Result type for downloader operations.
pub type Result<T, E = DownloadError> = std::result::Result<T, E>;

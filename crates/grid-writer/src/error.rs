//! Error types for grid export.

use std::path::{Path, PathBuf};

use grd_parser::GrdError;
use thiserror::Error;

/// Errors that can occur while writing or converting grids.
#[derive(Error, Debug)]
pub enum WriterError {
    /// Failed to decode the source grid.
    #[error(transparent)]
    Decode(#[from] GrdError),

    /// GeoTIFF encoding error.
    #[error("GeoTIFF error: {0}")]
    Tiff(String),

    /// NetCDF library error.
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    /// The requested format was not compiled in.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The grid lacks information the format needs.
    #[error("grid cannot be written: {0}")]
    InvalidGrid(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to start the conversion pool.
    #[error("failed to build conversion pool: {0}")]
    ThreadPool(String),

    /// Filesystem error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriterError {
    /// Create an Io error for `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<tiff::TiffError> for WriterError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Tiff(err.to_string())
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::Error> for WriterError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCdf(err.to_string())
    }
}

/// Result type for writer operations.
pub type WriterResult<T> = std::result::Result<T, WriterError>;

//! Output formats and the [`GridWriter`] seam.

mod geotiff;
#[cfg(feature = "netcdf")]
mod netcdf;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use grd_parser::DecodedGrid;
use imd_common::FileKind;
use serde::{Deserialize, Serialize};

use crate::error::{WriterError, WriterResult};

pub use geotiff::GeoTiffWriter;
#[cfg(feature = "netcdf")]
pub use netcdf::NetCdfWriter;

/// Persists a decoded grid with its georeference.
pub trait GridWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Write `grid` to `path`, replacing any existing file.
    fn write_grid(&self, path: &Path, grid: &DecodedGrid) -> WriterResult<()>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    GeoTiff,
    NetCdf,
}

impl OutputFormat {
    pub fn file_kind(&self) -> FileKind {
        match self {
            OutputFormat::GeoTiff => FileKind::GeoTiff,
            OutputFormat::NetCdf => FileKind::NetCdf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::GeoTiff => "geotiff",
            OutputFormat::NetCdf => "netcdf",
        }
    }

    /// True if this build can write the format.
    pub fn is_available(&self) -> bool {
        match self {
            OutputFormat::GeoTiff => true,
            OutputFormat::NetCdf => cfg!(feature = "netcdf"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = WriterError;

    /// Parse from string (case-insensitive). Extensions are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geotiff" | "tiff" | "tif" => Ok(OutputFormat::GeoTiff),
            "netcdf" | "nc" => Ok(OutputFormat::NetCdf),
            other => Err(WriterError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writer for `format`, or `UnsupportedFormat` when it was not compiled in.
pub fn writer_for(format: OutputFormat) -> WriterResult<Arc<dyn GridWriter>> {
    match format {
        OutputFormat::GeoTiff => Ok(Arc::new(GeoTiffWriter::new())),
        #[cfg(feature = "netcdf")]
        OutputFormat::NetCdf => Ok(Arc::new(NetCdfWriter::new())),
        #[cfg(not(feature = "netcdf"))]
        OutputFormat::NetCdf => Err(WriterError::UnsupportedFormat(
            "netcdf (build with --features netcdf)".to_string(),
        )),
    }
}

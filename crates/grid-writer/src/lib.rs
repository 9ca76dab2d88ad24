//! Export of decoded IMD grids.
//!
//! Decoded grids are handed to a [`GridWriter`] which persists them as
//! GeoTIFF or, with the `netcdf` feature, as CF NetCDF. The [`Converter`]
//! runs many such conversions on a dedicated rayon pool.
//!
//! ```text
//! raw .grd files ──► decode_file ──► DecodedGrid ──► GridWriter ──► .tif / .nc
//!                      (one rayon job per day, results over mpsc)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_writer::{ConvertMode, Converter, OutputFormat, WriterConfig};
//!
//! let converter = Converter::new(WriterConfig::from_env())?;
//! let outcomes = converter.convert(spec, &files, out_dir, OutputFormat::GeoTiff, ConvertMode::PerDay)?;
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod writer;

pub use config::WriterConfig;
pub use convert::{ConversionOutcome, ConversionStatus, ConvertMode, Converter};
pub use error::{WriterError, WriterResult};
pub use writer::{writer_for, GeoTiffWriter, GridWriter, OutputFormat};

#[cfg(feature = "netcdf")]
pub use writer::NetCdfWriter;

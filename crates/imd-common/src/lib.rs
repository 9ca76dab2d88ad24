//! Common types shared across the IMD daily grid crates.
//!
//! - [`catalog`]: the fixed registry of supported parameters
//! - [`time`]: request date windows and day iteration
//! - [`address`]: remote URLs and local filenames for a (parameter, date) pair
//! - [`extent`]: geographic extents of the grids

pub mod address;
pub mod catalog;
pub mod error;
pub mod extent;
pub mod time;

pub use address::{range_filename, FileKind, GridFileRef};
pub use catalog::{GridOrientation, Parameter, ParameterSpec};
pub use error::{ImdError, ImdResult};
pub use extent::Extent;
pub use time::{parse_date, DateIter, DateWindow};

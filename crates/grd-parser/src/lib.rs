//! Decoder for the flat binary `.grd` grids published by IMD.
//!
//! A `.grd` file is a headerless run of little-endian `f32` values, one
//! `lat_count * lon_count` block per day. Decoding reshapes each block,
//! reorients it to north-up rows running west to east and masks the
//! parameter's fill value.
//!
//! ```ignore
//! use grd_parser::decode_file;
//! use imd_common::Parameter;
//!
//! let grid = decode_file(Parameter::Rain.spec(), "rain_20200601.grd")?;
//! assert_eq!(grid.shape(), (1, 129, 135));
//! ```

pub mod decode;
pub mod error;
pub mod grid;
pub mod orientation;

pub use decode::{decode, decode_concatenated, decode_file, encode};
pub use error::{GrdError, GrdResult};
pub use grid::DecodedGrid;

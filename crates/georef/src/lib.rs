//! Georeferencing for the regular lat/lon grids in the catalog.
//!
//! All grids are geographic (EPSG:4326). A [`GeoReference`] carries the
//! affine transform used by raster writers and the coordinate vectors used by
//! labelled-array writers; both describe the same cell centres.

pub mod affine;
pub mod crs;
pub mod reference;

pub use affine::AffineTransform;
pub use crs::Crs;
pub use reference::{linspace, GeoReference};

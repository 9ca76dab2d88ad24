//! Coordinate reference system tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference systems a grid can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// WGS84 Geographic (lat/lon in degrees)
    Epsg4326,
}

impl Crs {
    /// Numeric EPSG code.
    pub fn epsg(&self) -> u16 {
        match self {
            Crs::Epsg4326 => 4326,
        }
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Epsg4326)
    }

    /// Well-known text, as written into NetCDF `crs_wkt` attributes.
    pub fn wkt(&self) -> &'static str {
        match self {
            Crs::Epsg4326 => {
                "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],\
                 PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433],AUTHORITY[\"EPSG\",\"4326\"]]"
            }
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

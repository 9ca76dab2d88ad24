//! Geographic extent of a parameter grid.

use serde::{Deserialize, Serialize};

/// Extent of a regular lat/lon grid, in degrees.
///
/// The bounds are the centres of the outermost grid cells, not the cell
/// edges: a grid of `n` points at spacing `d` spans `(n - 1) * d` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Extent {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Check if a point lies inside the extent (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Number of grid points along each axis for a given spacing, as
    /// `(lat_count, lon_count)`.
    pub fn point_counts(&self, pixel_size: f64) -> (usize, usize) {
        (
            (self.height() / pixel_size).round() as usize + 1,
            (self.width() / pixel_size).round() as usize + 1,
        )
    }

    /// Outer cell edges `(west, south, east, north)` for a given spacing.
    pub fn edges(&self, pixel_size: f64) -> (f64, f64, f64, f64) {
        let half = pixel_size / 2.0;
        (
            self.lon_min - half,
            self.lat_min - half,
            self.lon_max + half,
            self.lat_max + half,
        )
    }
}

//! Building a [`GeoReference`] for a catalog entry.

use imd_common::ParameterSpec;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::affine::AffineTransform;
use crate::crs::Crs;

/// Affine transform, cell-centre coordinates and CRS of a grid.
///
/// `lat_coords` ascend from south to north. Decoded grids are stored north-up,
/// so row `r` of a grid sits at `lat_coords[lat_count - 1 - r]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    pub transform: AffineTransform,
    pub lat_coords: Vec<f64>,
    pub lon_coords: Vec<f64>,
    pub crs: Crs,
}

impl GeoReference {
    /// Georeference for a catalog entry. Pure function of `spec`.
    pub fn build(spec: &ParameterSpec) -> Self {
        let extent = &spec.extent;
        let (west, _, _, north) = extent.edges(spec.pixel_size);

        Self {
            transform: AffineTransform::from_origin(west, north, spec.pixel_size, spec.pixel_size),
            lat_coords: linspace(extent.lat_min, extent.lat_max, spec.lat_count),
            lon_coords: linspace(extent.lon_min, extent.lon_max, spec.lon_count),
            crs: Crs::Epsg4326,
        }
    }

    pub fn lat_count(&self) -> usize {
        self.lat_coords.len()
    }

    pub fn lon_count(&self) -> usize {
        self.lon_coords.len()
    }

    /// Latitude of a north-up row.
    pub fn row_latitude(&self, row: usize) -> Option<f64> {
        let n = self.lat_coords.len();
        (row < n).then(|| self.lat_coords[n - 1 - row])
    }

    /// Longitude of a column.
    pub fn col_longitude(&self, col: usize) -> Option<f64> {
        self.lon_coords.get(col).copied()
    }

    /// Nearest `(row, col)` for a point, or `None` outside the grid.
    pub fn index_of(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        let (col, row) = self.transform.pixel_at(lon, lat)?;
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row.floor() as usize, col.floor() as usize);
        (row < self.lat_count() && col < self.lon_count()).then_some((row, col))
    }
}

/// `n` evenly spaced values from `start` to `stop`, both ends exact.
pub fn linspace<T: Float>(start: T, stop: T, n: usize) -> Vec<T> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let steps = T::from(n - 1).unwrap_or_else(T::one);
            let step = (stop - start) / steps;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        stop
                    } else {
                        start + step * T::from(i).unwrap_or_else(T::zero)
                    }
                })
                .collect()
        }
    }
}

//! Axis handling between raw payload order and north-up rows.
//!
//! Decoded grids are row-major `(lat, lon)` with row 0 at the northern edge
//! and column 0 at the western edge. [`source_index`] maps such a cell back to
//! its position in the raw payload of one day, for each [`GridOrientation`].

use imd_common::GridOrientation;

/// Index into the raw payload of the value shown at north-up `(row, col)`.
pub fn source_index(
    orientation: GridOrientation,
    row: usize,
    col: usize,
    lat_count: usize,
    lon_count: usize,
) -> usize {
    match orientation {
        GridOrientation::NorthUp => row * lon_count + col,
        GridOrientation::SouthUp => (lat_count - 1 - row) * lon_count + col,
        // Transpose (lon, lat) -> (lat, lon), then flip latitude.
        GridOrientation::LonMajorSouthUp => col * lat_count + (lat_count - 1 - row),
    }
}

/// Reorder one day of raw values into north-up rows.
///
/// `raw.len()` must equal `lat_count * lon_count`.
pub fn to_north_up(
    orientation: GridOrientation,
    raw: &[f32],
    lat_count: usize,
    lon_count: usize,
) -> Vec<f32> {
    debug_assert_eq!(raw.len(), lat_count * lon_count);
    if orientation == GridOrientation::NorthUp {
        return raw.to_vec();
    }

    let mut out = Vec::with_capacity(raw.len());
    for row in 0..lat_count {
        for col in 0..lon_count {
            out.push(raw[source_index(orientation, row, col, lat_count, lon_count)]);
        }
    }
    out
}

/// Inverse of [`to_north_up`]: lay north-up rows back out in payload order.
pub fn from_north_up(
    orientation: GridOrientation,
    grid: &[f32],
    lat_count: usize,
    lon_count: usize,
) -> Vec<f32> {
    debug_assert_eq!(grid.len(), lat_count * lon_count);
    if orientation == GridOrientation::NorthUp {
        return grid.to_vec();
    }

    let mut raw = vec![0.0; grid.len()];
    for row in 0..lat_count {
        for col in 0..lon_count {
            raw[source_index(orientation, row, col, lat_count, lon_count)] =
                grid[row * lon_count + col];
        }
    }
    raw
}

//! Raw payload decoding.

use std::path::Path;

use imd_common::ParameterSpec;
use tracing::{debug, instrument};

use crate::error::{GrdError, GrdResult};
use crate::grid::DecodedGrid;
use crate::orientation::{from_north_up, to_north_up};

const VALUE_SIZE: usize = std::mem::size_of::<f32>();

/// Decode a raw payload of one or more days.
///
/// The payload must hold a whole, non-zero number of
/// `lat_count * lon_count` blocks of little-endian `f32`.
pub fn decode(spec: &ParameterSpec, raw: &[u8]) -> GrdResult<DecodedGrid> {
    let day_len = spec.day_byte_len();
    if raw.is_empty() || raw.len() % day_len != 0 {
        return Err(GrdError::TruncatedGrid {
            actual: raw.len(),
            expected: day_len,
        });
    }

    let time_count = raw.len() / day_len;
    let mut data = Vec::with_capacity(raw.len() / VALUE_SIZE);

    for day in raw.chunks_exact(day_len) {
        let values: Vec<f32> = day
            .chunks_exact(VALUE_SIZE)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let oriented = to_north_up(spec.orientation, &values, spec.lat_count, spec.lon_count);
        data.extend(
            oriented
                .into_iter()
                .map(|v| if spec.is_fill(v) { f32::NAN } else { v }),
        );
    }

    Ok(DecodedGrid::from_parts(spec, time_count, data))
}

/// Read and decode a `.grd` file.
#[instrument(skip_all, fields(parameter = %spec.parameter, path = %path.as_ref().display()))]
pub fn decode_file(spec: &ParameterSpec, path: impl AsRef<Path>) -> GrdResult<DecodedGrid> {
    let path = path.as_ref();
    let raw = std::fs::read(path).map_err(|e| GrdError::io(path, e))?;
    let grid = decode(spec, &raw)?;
    debug!(
        time_count = grid.time_count,
        masked = grid.masked_count(),
        "Decoded grid file"
    );
    Ok(grid)
}

/// Decode several files into one grid with a leading time axis.
///
/// The time axis follows the order of `paths`.
pub fn decode_concatenated<P: AsRef<Path>>(
    spec: &ParameterSpec,
    paths: &[P],
) -> GrdResult<DecodedGrid> {
    let grids = paths
        .iter()
        .map(|path| decode_file(spec, path))
        .collect::<GrdResult<Vec<_>>>()?;
    DecodedGrid::stack(grids)
}

/// Lay a grid back out as a raw payload: masked cells become the fill value
/// and each day is written in the parameter's stored orientation.
pub fn encode(spec: &ParameterSpec, grid: &DecodedGrid) -> Vec<u8> {
    let mut raw = Vec::with_capacity(grid.data.len() * VALUE_SIZE);
    let fill = spec.fill_value;

    for time in 0..grid.time_count {
        let Some(slice) = grid.slice(time) else { break };
        let unmasked: Vec<f32> = slice
            .iter()
            .map(|&v| if v.is_nan() { fill } else { v })
            .collect();
        for v in from_north_up(spec.orientation, &unmasked, spec.lat_count, spec.lon_count) {
            raw.extend_from_slice(&v.to_le_bytes());
        }
    }
    raw
}

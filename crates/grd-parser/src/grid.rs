//! Decoded grid container.

use chrono::NaiveDate;
use georef::GeoReference;
use imd_common::{Parameter, ParameterSpec};

use crate::error::{GrdError, GrdResult};

/// One or more days of a parameter, north-up, with georeference attached.
///
/// Values are laid out `(time, lat, lon)` row-major. Cells that held the
/// parameter's fill value are stored as `NaN`; use [`DecodedGrid::get`] or
/// [`DecodedGrid::valid_values`] to work with data cells only.
#[derive(Debug, Clone)]
pub struct DecodedGrid {
    pub parameter: Parameter,
    pub units: &'static str,
    pub long_name: &'static str,
    /// Sentinel written back for masked cells on export
    pub fill_value: f32,
    pub time_count: usize,
    pub lat_count: usize,
    pub lon_count: usize,
    pub data: Vec<f32>,
    /// Date of each time step, when known
    pub dates: Vec<NaiveDate>,
    pub georef: GeoReference,
}

impl DecodedGrid {
    /// Wrap already oriented and masked values.
    ///
    /// `data.len()` must be `time_count * lat_count * lon_count`.
    pub(crate) fn from_parts(spec: &ParameterSpec, time_count: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), time_count * spec.cell_count());
        Self {
            parameter: spec.parameter,
            units: spec.units,
            long_name: spec.long_name,
            fill_value: spec.fill_value,
            time_count,
            lat_count: spec.lat_count,
            lon_count: spec.lon_count,
            data,
            dates: Vec::new(),
            georef: GeoReference::build(spec),
        }
    }

    /// Attach a date to every time step.
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> GrdResult<Self> {
        if dates.len() != self.time_count {
            return Err(GrdError::DateCountMismatch {
                expected: self.time_count,
                actual: dates.len(),
            });
        }
        self.dates = dates;
        Ok(self)
    }

    /// Join grids along the time axis, keeping their order.
    ///
    /// All grids must share parameter and spatial shape. Dates carry over
    /// only when every input has a full set.
    pub fn stack(grids: Vec<DecodedGrid>) -> GrdResult<Self> {
        let mut grids = grids.into_iter();
        let mut stacked = grids.next().ok_or(GrdError::EmptyRange)?;
        let mut dated = stacked.dates.len() == stacked.time_count;

        for grid in grids {
            if grid.parameter != stacked.parameter
                || (grid.lat_count, grid.lon_count) != (stacked.lat_count, stacked.lon_count)
            {
                return Err(GrdError::StackMismatch {
                    expected: stacked.describe(),
                    actual: grid.describe(),
                });
            }
            dated &= grid.dates.len() == grid.time_count;
            stacked.time_count += grid.time_count;
            stacked.data.extend_from_slice(&grid.data);
            stacked.dates.extend(grid.dates);
        }

        if !dated {
            stacked.dates.clear();
        }
        Ok(stacked)
    }

    fn describe(&self) -> String {
        format!("{} {}x{}", self.parameter, self.lat_count, self.lon_count)
    }

    /// `(time, lat, lon)`. A single-day grid has `time == 1`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time_count, self.lat_count, self.lon_count)
    }

    /// Shape without a length-one time axis: `[lat, lon]` for a single day,
    /// `[time, lat, lon]` otherwise.
    pub fn dims(&self) -> Vec<usize> {
        if self.is_time_series() {
            vec![self.time_count, self.lat_count, self.lon_count]
        } else {
            vec![self.lat_count, self.lon_count]
        }
    }

    /// True when the grid carries more than one day.
    pub fn is_time_series(&self) -> bool {
        self.time_count > 1
    }

    fn cells_per_step(&self) -> usize {
        self.lat_count * self.lon_count
    }

    /// Value at `(time, row, col)`, `None` when masked or out of range.
    pub fn get(&self, time: usize, row: usize, col: usize) -> Option<f32> {
        if time >= self.time_count || row >= self.lat_count || col >= self.lon_count {
            return None;
        }
        let value = self.data[time * self.cells_per_step() + row * self.lon_count + col];
        (!value.is_nan()).then_some(value)
    }

    /// One time step as a north-up `(lat, lon)` slice.
    pub fn slice(&self, time: usize) -> Option<&[f32]> {
        let n = self.cells_per_step();
        let start = time.checked_mul(n)?;
        self.data.get(start..start + n)
    }

    /// Iterator over unmasked values.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|v| !v.is_nan())
    }

    pub fn valid_count(&self) -> usize {
        self.valid_values().count()
    }

    pub fn masked_count(&self) -> usize {
        self.data.len() - self.valid_count()
    }

    /// Smallest and largest unmasked value.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.valid_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Values as `f64` with masked cells set back to the fill value, the form
    /// expected by raster writers that take an explicit nodata value.
    pub fn to_export_values(&self) -> Vec<f64> {
        let fill = self.fill_value as f64;
        self.data
            .iter()
            .map(|&v| if v.is_nan() { fill } else { v as f64 })
            .collect()
    }

    /// One time step of [`DecodedGrid::to_export_values`].
    pub fn export_slice(&self, time: usize) -> Option<Vec<f64>> {
        let fill = self.fill_value as f64;
        self.slice(time).map(|s| {
            s.iter()
                .map(|&v| if v.is_nan() { fill } else { v as f64 })
                .collect()
        })
    }
}

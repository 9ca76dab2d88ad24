//! CF-1.7 NetCDF output.
//!
//! Dimensions are `(time, lat, lon)` with ascending latitude, so rows are
//! written south to north, the reverse of the in-memory north-up layout.

use std::path::Path;

use chrono::Utc;
use grd_parser::DecodedGrid;
use tracing::debug;

use crate::error::{WriterError, WriterResult};
use crate::writer::{GridWriter, OutputFormat};

/// Writes CF NetCDF files through libnetcdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetCdfWriter;

impl NetCdfWriter {
    pub fn new() -> Self {
        Self
    }
}

impl GridWriter for NetCdfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::NetCdf
    }

    fn write_grid(&self, path: &Path, grid: &DecodedGrid) -> WriterResult<()> {
        let result = write_file(path, grid);
        if result.is_err() {
            let _ = std::fs::remove_file(path);
        }
        result
    }
}

fn write_file(path: &Path, grid: &DecodedGrid) -> WriterResult<()> {
    let first = *grid.dates.first().ok_or_else(|| {
        WriterError::InvalidGrid("NetCDF export needs a date for every time step".to_string())
    })?;
    let times: Vec<f64> = grid
        .dates
        .iter()
        .map(|d| (*d - first).num_days() as f64)
        .collect();

    let mut file = netcdf::create(path)?;

    file.add_dimension("time", grid.time_count)?;
    file.add_dimension("lat", grid.lat_count)?;
    file.add_dimension("lon", grid.lon_count)?;

    file.add_attribute("Conventions", "CF-1.7")?;
    file.add_attribute(
        "title",
        format!("IMD daily {} ({})", grid.long_name, grid.parameter.id()),
    )?;
    file.add_attribute("source", "India Meteorological Department, Pune")?;
    file.add_attribute(
        "history",
        format!("Created {} by imddaily", Utc::now().format("%Y-%m-%dT%H:%M:%SZ")),
    )?;

    {
        let mut time = file.add_variable::<f64>("time", &["time"])?;
        time.put_attribute("standard_name", "time")?;
        time.put_attribute("units", format!("days since {first}"))?;
        time.put_attribute("calendar", "standard")?;
        time.put_values(&times, ..)?;
    }
    {
        let mut lat = file.add_variable::<f64>("lat", &["lat"])?;
        lat.put_attribute("standard_name", "latitude")?;
        lat.put_attribute("units", "degrees_north")?;
        lat.put_values(&grid.georef.lat_coords, ..)?;
    }
    {
        let mut lon = file.add_variable::<f64>("lon", &["lon"])?;
        lon.put_attribute("standard_name", "longitude")?;
        lon.put_attribute("units", "degrees_east")?;
        lon.put_values(&grid.georef.lon_coords, ..)?;
    }

    let fill = grid.fill_value;
    let mut values = Vec::with_capacity(grid.data.len());
    for t in 0..grid.time_count {
        let slice = grid
            .slice(t)
            .ok_or_else(|| WriterError::InvalidGrid(format!("missing time step {t}")))?;
        for row in slice.chunks(grid.lon_count).rev() {
            values.extend(row.iter().map(|&v| if v.is_nan() { fill } else { v }));
        }
    }

    let mut var = file.add_variable::<f32>(grid.parameter.id(), &["time", "lat", "lon"])?;
    var.set_fill_value(fill)?;
    var.put_attribute("units", grid.units)?;
    var.put_attribute("long_name", grid.long_name)?;
    var.put_values(&values, ..)?;

    debug!(
        path = %path.display(),
        time_count = grid.time_count,
        "Wrote NetCDF"
    );
    Ok(())
}

//! Fixed registry of the gridded products served by IMD Pune.
//!
//! Every supported parameter has exactly one [`ParameterSpec`]. The table is
//! built once on first access and is read-only afterwards, so it can be shared
//! freely between download and conversion workers.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{ImdError, ImdResult};
use crate::extent::Extent;

const IMD_BASE_URL: &str = "https://www.imdpune.gov.in/Seasons/Temperature/";

/// Supported parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// GPM merged rainfall, 0.25°
    RainGpm,
    /// Maximum temperature, 0.5°
    Tmax,
    /// Minimum temperature, 0.5°
    Tmin,
    /// Gauge based rainfall, 0.25°
    Rain,
    /// Maximum temperature, 1.0°
    TmaxOne,
    /// Minimum temperature, 1.0°
    TminOne,
}

impl Parameter {
    /// All parameters in catalog order.
    pub const ALL: [Parameter; 6] = [
        Parameter::RainGpm,
        Parameter::Tmax,
        Parameter::Tmin,
        Parameter::Rain,
        Parameter::TmaxOne,
        Parameter::TminOne,
    ];

    /// Catalog identifier, e.g. `"raingpm"`.
    pub fn id(&self) -> &'static str {
        match self {
            Parameter::RainGpm => "raingpm",
            Parameter::Tmax => "tmax",
            Parameter::Tmin => "tmin",
            Parameter::Rain => "rain",
            Parameter::TmaxOne => "tmaxone",
            Parameter::TminOne => "tminone",
        }
    }

    /// Catalog entry for this parameter.
    pub fn spec(&self) -> &'static ParameterSpec {
        &CATALOG[*self as usize]
    }

    /// Identifiers accepted by [`Parameter::from_str`].
    pub fn valid_ids() -> Vec<&'static str> {
        Parameter::ALL.iter().map(Parameter::id).collect()
    }

    /// True for the rainfall family (fill value -999.0).
    pub fn is_rainfall(&self) -> bool {
        matches!(self, Parameter::RainGpm | Parameter::Rain)
    }
}

impl FromStr for Parameter {
    type Err = ImdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| ImdError::UnknownParameter {
                id: s.to_string(),
                valid: Parameter::valid_ids(),
            })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// How the values of one day are laid out in a raw `.grd` payload.
///
/// Decoding always produces north-up rows running west to east; this value
/// says what has to be undone to get there. The orientation of the IMD files
/// has shifted between releases, so decoded output should be checked against
/// a known sample before a new entry is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridOrientation {
    /// Rows already run north to south.
    NorthUp,
    /// `(lat, lon)` row-major with the first row at the southern edge.
    SouthUp,
    /// `(lon, lat)` row-major (latitude varies fastest), southern edge first.
    LonMajorSouthUp,
}

/// Immutable description of one catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub parameter: Parameter,
    /// Directory URL on the remote service
    pub url_prefix: String,
    /// Leading part of the remote filename
    pub filename_prefix: &'static str,
    /// strftime pattern for the date part of the remote filename
    pub remote_date_format: &'static str,
    /// Leading part of local filenames
    pub output_prefix: &'static str,
    pub lat_count: usize,
    pub lon_count: usize,
    /// Grid spacing in degrees
    pub pixel_size: f64,
    /// Sentinel for cells without data
    pub fill_value: f32,
    pub units: &'static str,
    pub long_name: &'static str,
    pub extent: Extent,
    /// First day published by the service
    pub earliest_date: NaiveDate,
    pub orientation: GridOrientation,
}

impl ParameterSpec {
    /// Look up a catalog entry by identifier.
    pub fn lookup(id: &str) -> ImdResult<&'static ParameterSpec> {
        id.parse::<Parameter>().map(|p| p.spec())
    }

    /// All catalog entries in table order.
    pub fn all() -> &'static [ParameterSpec] {
        CATALOG.as_slice()
    }

    pub fn id(&self) -> &'static str {
        self.parameter.id()
    }

    /// Number of values in one day of data.
    pub fn cell_count(&self) -> usize {
        self.lat_count * self.lon_count
    }

    /// Size in bytes of one day of raw data.
    pub fn day_byte_len(&self) -> usize {
        self.cell_count() * std::mem::size_of::<f32>()
    }

    /// Human readable grid spacing, e.g. `"0.25 degree(s)"`.
    pub fn px_size_label(&self) -> String {
        format!("{} degree(s)", self.pixel_size)
    }

    /// True if `value` is the no-data sentinel for this parameter.
    pub fn is_fill(&self, value: f32) -> bool {
        value == self.fill_value
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[allow(clippy::too_many_arguments)]
fn entry(
    parameter: Parameter,
    dir: &str,
    filename_prefix: &'static str,
    remote_date_format: &'static str,
    output_prefix: &'static str,
    (lat_count, lon_count): (usize, usize),
    pixel_size: f64,
    extent: Extent,
    earliest_date: NaiveDate,
) -> ParameterSpec {
    let (fill_value, units, long_name) = match parameter {
        Parameter::RainGpm => (-999.0, "mm", "GPM merged daily rainfall"),
        Parameter::Rain => (-999.0, "mm", "Daily gridded rainfall"),
        Parameter::Tmax | Parameter::TmaxOne => (99.9, "degC", "Daily maximum temperature"),
        Parameter::Tmin | Parameter::TminOne => (99.9, "degC", "Daily minimum temperature"),
    };

    ParameterSpec {
        parameter,
        url_prefix: format!("{IMD_BASE_URL}{dir}"),
        filename_prefix,
        remote_date_format,
        output_prefix,
        lat_count,
        lon_count,
        pixel_size,
        fill_value,
        units,
        long_name,
        extent,
        earliest_date,
        orientation: GridOrientation::SouthUp,
    }
}

static CATALOG: Lazy<[ParameterSpec; 6]> = Lazy::new(|| {
    // Both temperature resolutions cover the same box.
    let temperature = Extent::new(7.5, 37.5, 67.5, 97.5);

    [
        entry(
            Parameter::RainGpm,
            "gpm/",
            "",
            "%d%m%Y",
            "raingpm_",
            (281, 241),
            0.25,
            Extent::new(-10.0, 60.0, 60.0, 120.0),
            date(2015, 10, 1),
        ),
        entry(
            Parameter::Tmax,
            "max/",
            "max",
            "%d%m%Y",
            "tmax_",
            (61, 61),
            0.5,
            temperature,
            date(2015, 6, 1),
        ),
        entry(
            Parameter::Tmin,
            "min/",
            "min",
            "%d%m%Y",
            "tmin_",
            (61, 61),
            0.5,
            temperature,
            date(2015, 6, 1),
        ),
        entry(
            Parameter::Rain,
            "Rainfall/",
            "rain_ind0.25_",
            "%y_%m_%d",
            "rain_",
            (129, 135),
            0.25,
            Extent::new(6.5, 38.5, 66.5, 100.0),
            date(2018, 12, 9),
        ),
        entry(
            Parameter::TmaxOne,
            "max/",
            "max1_",
            "%d%m%Y",
            "tmax1_",
            (31, 31),
            1.0,
            temperature,
            date(2019, 1, 1),
        ),
        entry(
            Parameter::TminOne,
            "min/",
            "min1_",
            "%d%m%Y",
            "tmin1_",
            (31, 31),
            1.0,
            temperature,
            date(2019, 1, 1),
        ),
    ]
});

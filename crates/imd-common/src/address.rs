//! Remote and local file addressing.
//!
//! Everything here is a pure function of `(ParameterSpec, date)`; nothing
//! touches the network or the filesystem.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::catalog::ParameterSpec;

/// Date format used in local filenames.
pub const LOCAL_DATE_FORMAT: &str = "%Y%m%d";

/// Kind of local file, which decides the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Raw download as published
    Raw,
    GeoTiff,
    NetCdf,
}

impl FileKind {
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Raw => "grd",
            FileKind::GeoTiff => "tif",
            FileKind::NetCdf => "nc",
        }
    }
}

impl ParameterSpec {
    /// URL of the published file for `date`.
    pub fn remote_url(&self, date: NaiveDate) -> String {
        format!(
            "{}{}{}.grd",
            self.url_prefix,
            self.filename_prefix,
            date.format(self.remote_date_format)
        )
    }

    /// Local filename for `date`, e.g. `rain_20200624.grd`.
    pub fn local_filename(&self, date: NaiveDate, kind: FileKind) -> String {
        format!(
            "{}{}.{}",
            self.output_prefix,
            date.format(LOCAL_DATE_FORMAT),
            kind.extension()
        )
    }
}

/// Filename for a single output covering several days,
/// e.g. `tmax_20200601_20200610.nc`.
pub fn range_filename(spec: &ParameterSpec, start: NaiveDate, end: NaiveDate, kind: FileKind) -> String {
    format!(
        "{}{}_{}.{}",
        spec.output_prefix,
        start.format(LOCAL_DATE_FORMAT),
        end.format(LOCAL_DATE_FORMAT),
        kind.extension()
    )
}

/// Where one day of raw data comes from and where it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFileRef {
    pub date: NaiveDate,
    pub remote_url: String,
    pub local_filename: String,
    pub local_path: PathBuf,
}

impl GridFileRef {
    pub fn new(spec: &ParameterSpec, date: NaiveDate, base_dir: &Path) -> Self {
        let local_filename = spec.local_filename(date, FileKind::Raw);
        Self {
            date,
            remote_url: spec.remote_url(date),
            local_path: base_dir.join(&local_filename),
            local_filename,
        }
    }
}

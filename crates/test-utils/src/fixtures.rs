//! Common test fixtures for imd-daily tests.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

/// Grid shapes of the catalog, as `(id, lat_count, lon_count)`.
pub mod shapes {
    pub const RAINGPM: (&str, usize, usize) = ("raingpm", 281, 241);
    pub const TMAX: (&str, usize, usize) = ("tmax", 61, 61);
    pub const TMIN: (&str, usize, usize) = ("tmin", 61, 61);
    pub const RAIN: (&str, usize, usize) = ("rain", 129, 135);
    pub const TMAXONE: (&str, usize, usize) = ("tmaxone", 31, 31);
    pub const TMINONE: (&str, usize, usize) = ("tminone", 31, 31);

    pub const ALL: [(&str, usize, usize); 6] = [RAINGPM, TMAX, TMIN, RAIN, TMAXONE, TMINONE];
}

/// Shorthand for building dates in tests.
pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Temporary directory standing in for a local download cache.
///
/// Removed when dropped.
pub struct TempGridDir {
    dir: TempDir,
}

impl TempGridDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::Builder::new()
                .prefix("imd_grids_")
                .tempdir()
                .expect("Failed to create temporary grid directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `bytes` to `name` inside the directory.
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).expect("Failed to write test grid");
        path
    }

    /// Creates an empty subdirectory, e.g. for converted output.
    pub fn subdir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create test subdirectory");
        path
    }

    /// True if `name` exists inside the directory.
    pub fn contains(&self, name: &str) -> bool {
        self.dir.path().join(name).is_file()
    }

    /// Sorted names of the regular files in the directory.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("Failed to list test directory")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}

impl Default for TempGridDir {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_cover_catalog() {
        assert_eq!(shapes::ALL.len(), 6);
        assert!(shapes::ALL.iter().all(|(_, lat, lon)| lat * lon > 0));
    }

    #[test]
    fn test_temp_grid_dir() {
        let dir = TempGridDir::new();
        dir.write("rain_20200601.grd", &[0, 0, 0, 0]);
        dir.subdir("out");
        assert!(dir.contains("rain_20200601.grd"));
        assert!(!dir.contains("out"));
        assert_eq!(dir.file_names(), vec!["rain_20200601.grd".to_string()]);
    }
}

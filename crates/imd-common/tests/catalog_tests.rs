//! Cross-module checks on the catalog, windows and addressing.

use chrono::NaiveDate;
use imd_common::{DateWindow, FileKind, GridFileRef, ImdError, Parameter, ParameterSpec};
use std::path::Path;

#[test]
fn test_every_parameter_resolves_its_own_earliest_day() {
    for spec in ParameterSpec::all() {
        let start = spec.earliest_date.format("%Y-%m-%d").to_string();
        let window = DateWindow::resolve(spec, Some(&start), None).unwrap();
        assert_eq!(window.start(), spec.earliest_date);
    }
}

#[test]
fn test_window_file_refs_are_unique_and_ordered() {
    let spec = ParameterSpec::lookup("rain").unwrap();
    let window = DateWindow::resolve(spec, Some("2020-06-30"), Some("2020-06-21")).unwrap();

    let refs: Vec<GridFileRef> = window
        .dates()
        .map(|d| GridFileRef::new(spec, d, Path::new("/tmp/imd")))
        .collect();

    assert_eq!(refs.len(), 10);
    assert_eq!(refs[0].local_filename, "rain_20200621.grd");
    assert_eq!(refs[9].local_filename, "rain_20200630.grd");

    let mut names: Vec<_> = refs.iter().map(|r| r.local_filename.clone()).collect();
    names.dedup();
    assert_eq!(names.len(), 10);
}

#[test]
fn test_unknown_parameter_lists_valid_ids() {
    let err = "humidity".parse::<Parameter>().unwrap_err();
    let message = err.to_string();
    for id in ["raingpm", "tmax", "tmin", "rain", "tmaxone", "tminone"] {
        assert!(message.contains(id), "{message}");
    }
}

#[test]
fn test_catalog_serializes_to_json() {
    let json = serde_json::to_value(Parameter::Rain.spec()).unwrap();
    assert_eq!(json["parameter"], "rain");
    assert_eq!(json["lat_count"], 129);
    assert_eq!(json["earliest_date"], "2018-12-09");
    assert_eq!(json["orientation"], "south_up");
}

#[test]
fn test_raw_and_export_names_share_stem() {
    let spec = Parameter::Tmax.spec();
    let date = NaiveDate::from_ymd_opt(2020, 6, 5).unwrap();
    let raw = spec.local_filename(date, FileKind::Raw);
    let tif = spec.local_filename(date, FileKind::GeoTiff);
    assert_eq!(raw.trim_end_matches(".grd"), tif.trim_end_matches(".tif"));
}

#[test]
fn test_validation_error_is_not_io() {
    assert!(matches!(
        DateWindow::resolve(Parameter::Tmin.spec(), Some(""), None),
        Err(ImdError::MissingStartDate)
    ));
}

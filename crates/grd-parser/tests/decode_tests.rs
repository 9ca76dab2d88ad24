//! Integration tests for decoding `.grd` files from disk.

use grd_parser::{decode, decode_concatenated, decode_file, encode, GrdError};
use imd_common::{FileKind, Parameter, ParameterSpec};
use test_utils::{
    create_precipitation_grid, create_temperature_grid, create_test_grid, encode_grd_payload,
    require_test_file, shapes, south_up_payload, with_fill_cells, ymd, TempGridDir,
};

#[test]
fn test_decode_file_restores_north_up_layout() {
    let spec = Parameter::Tmax.spec();
    let north_up = create_temperature_grid(spec.lon_count, spec.lat_count);
    let dir = TempGridDir::new();
    let path = dir.write(
        &spec.local_filename(ymd(2020, 6, 1), FileKind::Raw),
        &south_up_payload(&north_up, spec.lon_count),
    );

    let grid = decode_file(spec, &path).unwrap();
    assert_eq!(grid.shape(), (1, 61, 61));
    assert_eq!(grid.slice(0).unwrap(), north_up.as_slice());
    assert_eq!(grid.masked_count(), 0);
}

#[test]
fn test_every_catalog_shape_decodes() {
    for (id, lat, lon) in shapes::ALL {
        let spec = ParameterSpec::lookup(id).unwrap();
        let grid = decode(spec, &encode_grd_payload(&vec![0.0; lat * lon])).unwrap();
        assert_eq!(grid.shape(), (1, lat, lon), "{id}");
        assert_eq!(grid.georef.lat_count(), lat, "{id}");
        assert_eq!(grid.georef.lon_count(), lon, "{id}");
    }
}

#[test]
fn test_cells_line_up_with_coordinates() {
    let spec = Parameter::Rain.spec();
    let (w, h) = (spec.lon_count, spec.lat_count);
    // Each value encodes its own north-up (col, row).
    let north_up = create_test_grid(w, h);
    let grid = decode(spec, &south_up_payload(&north_up, w)).unwrap();

    let (row, col) = grid.georef.index_of(38.5, 66.5).unwrap();
    assert_eq!((row, col), (0, 0));
    assert_eq!(grid.get(0, row, col), Some(0.0));

    let (row, col) = grid.georef.index_of(6.5, 100.0).unwrap();
    assert_eq!((row, col), (h - 1, w - 1));
    assert_eq!(grid.get(0, row, col), Some(((w - 1) * 1000 + h - 1) as f32));
    assert_eq!(grid.georef.row_latitude(row), Some(6.5));
}

#[test]
fn test_rain_fill_cells_are_masked() {
    let spec = Parameter::Rain.spec();
    let (w, h) = (spec.lon_count, spec.lat_count);
    let north_up = with_fill_cells(
        create_precipitation_grid(w, h, 7),
        w,
        h,
        spec.fill_value,
        &[(0, 0), (10, 20), (w - 1, h - 1)],
    );

    let grid = decode(spec, &south_up_payload(&north_up, w)).unwrap();
    assert_eq!(grid.masked_count(), 3);
    assert_eq!(grid.get(0, 0, 0), None);
    assert_eq!(grid.get(0, 20, 10), None);
    assert_eq!(grid.get(0, h - 1, w - 1), None);
    assert!(grid.valid_values().all(|v| v >= 0.0));

    let export = grid.to_export_values();
    assert_eq!(export.iter().filter(|&&v| v == -999.0).count(), 3);
}

#[test]
fn test_concatenated_days_follow_path_order() {
    let spec = Parameter::TmaxOne.spec();
    let dir = TempGridDir::new();
    let cells = spec.cell_count();

    let paths: Vec<_> = (1..=3)
        .map(|day| {
            dir.write(
                &spec.local_filename(ymd(2021, 1, day), FileKind::Raw),
                &encode_grd_payload(&vec![day as f32; cells]),
            )
        })
        .collect();

    let grid = decode_concatenated(spec, &paths).unwrap();
    assert_eq!(grid.shape(), (3, 31, 31));
    for t in 0..3 {
        assert_eq!(grid.get(t, 15, 15), Some((t + 1) as f32));
    }

    let reversed: Vec<_> = paths.iter().rev().collect();
    let grid = decode_concatenated(spec, &reversed).unwrap();
    assert_eq!(grid.get(0, 0, 0), Some(3.0));

    let grid = grid
        .with_dates(vec![ymd(2021, 1, 3), ymd(2021, 1, 2), ymd(2021, 1, 1)])
        .unwrap();
    assert_eq!(grid.dates.len(), 3);
}

#[test]
fn test_concatenate_nothing_is_empty_range() {
    let spec = Parameter::Tmin.spec();
    let paths: Vec<std::path::PathBuf> = Vec::new();
    assert!(matches!(
        decode_concatenated(spec, &paths),
        Err(GrdError::EmptyRange)
    ));
}

#[test]
fn test_missing_file_reports_path() {
    let spec = Parameter::Tmin.spec();
    let dir = TempGridDir::new();
    let missing = dir.path().join("tmin_20200101.grd");

    match decode_file(spec, &missing) {
        Err(GrdError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn test_truncated_file_in_range_fails_whole_range() {
    let spec = Parameter::TminOne.spec();
    let dir = TempGridDir::new();
    let good = dir.write("a.grd", &encode_grd_payload(&vec![1.0; spec.cell_count()]));
    let bad = dir.write("b.grd", &encode_grd_payload(&vec![1.0; 10]));

    let err = decode_concatenated(spec, &[good, bad]).unwrap_err();
    assert!(err.is_corrupt_data());
}

#[test]
fn test_encode_round_trips_through_disk() {
    let spec = Parameter::RainGpm.spec();
    let (w, h) = (spec.lon_count, spec.lat_count);
    let north_up = with_fill_cells(
        create_precipitation_grid(w, h, 11),
        w,
        h,
        spec.fill_value,
        &[(3, 4)],
    );
    let raw = south_up_payload(&north_up, w);

    let dir = TempGridDir::new();
    let path = dir.write("raingpm_20200601.grd", &raw);
    let grid = decode_file(spec, &path).unwrap();
    assert_eq!(encode(spec, &grid), raw);
}

/// Sanity check against a real IMD download when one is available locally.
#[test]
fn test_real_rain_sample() {
    let path = require_test_file!("rain_20200601.grd");
    let spec = Parameter::Rain.spec();
    let grid = decode_file(spec, &path).unwrap();

    assert_eq!(grid.shape(), (1, 129, 135));
    // Sea cells are masked; a day of Indian rainfall is never all gaps.
    assert!(grid.masked_count() > 0);
    assert!(grid.valid_count() > 0);
    let (lo, _) = grid.value_range().unwrap();
    assert!(lo >= 0.0);
}

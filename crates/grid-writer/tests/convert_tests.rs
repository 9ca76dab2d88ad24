//! End-to-end conversion tests: raw `.grd` files in, GeoTIFF out.

use std::fs::File;
use std::path::Path;

use grd_parser::decode;
use grid_writer::{
    ConversionStatus, ConvertMode, Converter, GeoTiffWriter, GridWriter, OutputFormat,
    WriterConfig,
};
use imd_common::{DateWindow, FileKind, GridFileRef, Parameter, ParameterSpec};
use test_utils::{
    create_temperature_grid, encode_grd_payload, south_up_payload, with_fill_cells, ymd,
    TempGridDir,
};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

const GDAL_METADATA: u16 = 42112;

fn converter() -> Converter {
    Converter::new(WriterConfig {
        workers: 2,
        ..Default::default()
    })
    .unwrap()
}

fn cache_day(dir: &TempGridDir, spec: &ParameterSpec, day: u32, value: f32) -> GridFileRef {
    let file = GridFileRef::new(spec, ymd(2021, 1, day), dir.path());
    dir.write(
        &file.local_filename,
        &encode_grd_payload(&vec![value; spec.cell_count()]),
    );
    file
}

fn read_pages(path: &Path) -> Vec<Vec<f64>> {
    let mut decoder = Decoder::new(File::open(path).unwrap()).unwrap();
    let mut pages = Vec::new();
    loop {
        match decoder.read_image().unwrap() {
            DecodingResult::F64(values) => pages.push(values),
            _ => panic!("expected float64 samples"),
        }
        if !decoder.more_images() {
            break;
        }
        decoder.next_image().unwrap();
    }
    pages
}

fn read_pages_count(path: &Path) -> usize {
    let mut decoder = Decoder::new(File::open(path).unwrap()).unwrap();
    let mut count = 1;
    while decoder.more_images() {
        decoder.next_image().unwrap();
        count += 1;
    }
    count
}

/// Bands of a planar GeoTIFF, read straight from its strips.
fn read_bands(path: &Path) -> Vec<Vec<f64>> {
    let mut decoder = Decoder::new(File::open(path).unwrap()).unwrap();
    let samples = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap() as usize;
    assert_eq!(decoder.get_tag_u32(Tag::PlanarConfiguration).unwrap(), 2);
    let formats = decoder.get_tag_u32_vec(Tag::SampleFormat).unwrap();
    assert_eq!(formats, vec![3; samples]);

    let offsets = decoder.get_tag_u64_vec(Tag::StripOffsets).unwrap();
    let counts = decoder.get_tag_u64_vec(Tag::StripByteCounts).unwrap();
    assert_eq!(offsets.len(), samples);

    let bytes = std::fs::read(path).unwrap();
    offsets
        .iter()
        .zip(&counts)
        .map(|(&offset, &count)| {
            bytes[offset as usize..(offset + count) as usize]
                .chunks_exact(8)
                .map(|b| f64::from_ne_bytes(b.try_into().unwrap()))
                .collect()
        })
        .collect()
}

#[test]
fn test_geotiff_carries_georeference_and_nodata() {
    let spec = Parameter::TmaxOne.spec();
    let (w, h) = (spec.lon_count, spec.lat_count);
    let north_up = with_fill_cells(create_temperature_grid(w, h), w, h, spec.fill_value, &[(2, 3)]);
    let grid = decode(spec, &south_up_payload(&north_up, w))
        .unwrap()
        .with_dates(vec![ymd(2020, 6, 1)])
        .unwrap();

    let dir = TempGridDir::new();
    let path = dir.path().join("tmax1_20200601.tif");
    GeoTiffWriter::new().write_grid(&path, &grid).unwrap();

    let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (31, 31));
    assert_eq!(
        decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).unwrap(),
        vec![1.0, 1.0, 0.0]
    );
    assert_eq!(
        decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap(),
        vec![0.0, 0.0, 0.0, 67.0, 38.0, 0.0]
    );
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).unwrap();
    assert_eq!(keys.last(), Some(&4326));

    let nodata: f64 = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .unwrap()
        .trim_end_matches('\0')
        .parse()
        .unwrap();
    assert_eq!(nodata, spec.fill_value as f64);

    let metadata = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_METADATA)).unwrap();
    assert!(metadata.contains("<Item name=\"units\">degC</Item>"));
    assert!(metadata.contains("<Item name=\"date\">2020-06-01</Item>"));

    match decoder.read_image().unwrap() {
        DecodingResult::F64(values) => {
            assert_eq!(values, grid.to_export_values());
            assert_eq!(values[3 * w + 2], nodata);
        }
        _ => panic!("expected float64 samples"),
    }
}

#[test]
fn test_per_day_conversion_isolates_failures() {
    let spec = Parameter::TmaxOne.spec();
    let dir = TempGridDir::new();
    let mut files: Vec<_> = [1, 2, 4].iter().map(|&d| cache_day(&dir, spec, d, d as f32)).collect();

    // Day 3 is truncated on disk.
    let broken = GridFileRef::new(spec, ymd(2021, 1, 3), dir.path());
    dir.write(&broken.local_filename, &encode_grd_payload(&[1.0; 5]));
    files.push(broken);

    let out_dir = dir.subdir("out");
    let outcomes = converter()
        .convert(spec, &files, &out_dir, OutputFormat::GeoTiff, ConvertMode::PerDay)
        .unwrap();

    let dates: Vec<_> = outcomes.iter().map(|o| o.date).collect();
    assert_eq!(
        dates,
        vec![ymd(2021, 1, 1), ymd(2021, 1, 2), ymd(2021, 1, 3), ymd(2021, 1, 4)]
    );
    assert!(matches!(outcomes[2].status, ConversionStatus::Failed(_)));
    assert_eq!(outcomes.iter().filter(|o| o.is_converted()).count(), 3);

    for day in [1, 2, 4] {
        let name = spec.local_filename(ymd(2021, 1, day), FileKind::GeoTiff);
        let pages = read_pages(&out_dir.join(&name));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].iter().all(|&v| v == day as f64));
    }
    assert!(!out_dir.join("tmax1_20210103.tif").exists());
}

#[test]
fn test_single_file_stacks_days_as_bands() {
    let spec = Parameter::TminOne.spec();
    let dir = TempGridDir::new();
    let files = vec![
        cache_day(&dir, spec, 3, 3.0),
        cache_day(&dir, spec, 1, 1.0),
        cache_day(&dir, spec, 2, 2.0),
    ];

    let out_dir = dir.subdir("out");
    let outcomes = converter()
        .convert(spec, &files, &out_dir, OutputFormat::GeoTiff, ConvertMode::SingleFile)
        .unwrap();

    let expected = out_dir.join("tmin1_20210101_20210103.tif");
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes
        .iter()
        .all(|o| o.status == ConversionStatus::Converted(expected.clone())));

    // One image holding a band per day, not one page per day.
    assert_eq!(read_pages_count(&expected), 1);
    let bands = read_bands(&expected);
    assert_eq!(bands.len(), 3);
    for (i, band) in bands.iter().enumerate() {
        assert_eq!(band.len(), spec.cell_count());
        assert!(band.iter().all(|&v| v == (i + 1) as f64));
    }

    let mut decoder = Decoder::new(File::open(&expected).unwrap()).unwrap();
    assert_eq!(decoder.dimensions().unwrap(), (31, 31));
    assert_eq!(
        decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).unwrap(),
        vec![1.0, 1.0, 0.0]
    );
    let metadata = decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_METADATA))
        .unwrap();
    assert!(metadata.contains("sample=\"2\" role=\"description\">2021-01-03<"));
}

#[test]
fn test_single_file_leaves_out_bad_days() {
    let spec = Parameter::TmaxOne.spec();
    let dir = TempGridDir::new();
    let mut files = vec![cache_day(&dir, spec, 1, 1.0), cache_day(&dir, spec, 3, 3.0)];

    // Day 2 is truncated on disk.
    let broken = GridFileRef::new(spec, ymd(2021, 1, 2), dir.path());
    dir.write(&broken.local_filename, &encode_grd_payload(&[1.0; 5]));
    files.push(broken);

    let out_dir = dir.subdir("out");
    let outcomes = converter()
        .convert(spec, &files, &out_dir, OutputFormat::GeoTiff, ConvertMode::SingleFile)
        .unwrap();

    let expected = out_dir.join("tmax1_20210101_20210103.tif");
    let dates: Vec<_> = outcomes.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![ymd(2021, 1, 1), ymd(2021, 1, 2), ymd(2021, 1, 3)]);
    assert_eq!(outcomes[0].status, ConversionStatus::Converted(expected.clone()));
    assert!(matches!(outcomes[1].status, ConversionStatus::Failed(_)));
    assert_eq!(outcomes[2].status, ConversionStatus::Converted(expected.clone()));

    let bands = read_bands(&expected);
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0][0], 1.0);
    assert_eq!(bands[1][0], 3.0);
}

#[test]
fn test_single_file_with_every_day_bad_writes_nothing() {
    let spec = Parameter::TmaxOne.spec();
    let dir = TempGridDir::new();
    let broken = GridFileRef::new(spec, ymd(2021, 1, 1), dir.path());
    dir.write(&broken.local_filename, &encode_grd_payload(&[1.0; 5]));

    let out_dir = dir.subdir("out");
    let outcomes = converter()
        .convert(spec, &[broken], &out_dir, OutputFormat::GeoTiff, ConvertMode::SingleFile)
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].is_converted());
    assert!(std::fs::read_dir(&out_dir).unwrap().next().is_none());
}

#[test]
fn test_convert_cached_uses_existing_files_only() {
    let spec = Parameter::TmaxOne.spec();
    let dir = TempGridDir::new();
    cache_day(&dir, spec, 2, 20.0);
    cache_day(&dir, spec, 4, 22.0);

    let window = DateWindow::new(ymd(2021, 1, 1), ymd(2021, 1, 5));
    let out_dir = dir.subdir("tif");
    let outcomes = converter()
        .convert_cached(spec, &window, dir.path(), &out_dir, OutputFormat::GeoTiff, ConvertMode::PerDay)
        .unwrap();

    let dates: Vec<_> = outcomes.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![ymd(2021, 1, 2), ymd(2021, 1, 4)]);
    assert!(outcomes.iter().all(|o| o.is_converted()));
}

#[test]
fn test_nothing_to_convert() {
    let spec = Parameter::Rain.spec();
    let dir = TempGridDir::new();
    let out_dir = dir.path().join("nested/out");
    let outcomes = converter()
        .convert(spec, &[], &out_dir, OutputFormat::GeoTiff, ConvertMode::SingleFile)
        .unwrap();
    assert!(outcomes.is_empty());
    assert!(out_dir.is_dir());
}

#[cfg(not(feature = "netcdf"))]
#[test]
fn test_netcdf_needs_feature() {
    let spec = Parameter::Rain.spec();
    let dir = TempGridDir::new();
    let result = converter().convert(spec, &[], dir.path(), OutputFormat::NetCdf, ConvertMode::PerDay);
    assert!(matches!(result, Err(grid_writer::WriterError::UnsupportedFormat(_))));
}

#[cfg(feature = "netcdf")]
#[test]
fn test_netcdf_rows_ascend_south_to_north() {
    let spec = Parameter::TmaxOne.spec();
    let (w, h) = (spec.lon_count, spec.lat_count);
    let north_up = create_temperature_grid(w, h);
    let grid = decode(spec, &south_up_payload(&north_up, w))
        .unwrap()
        .with_dates(vec![ymd(2020, 6, 1)])
        .unwrap();

    let dir = TempGridDir::new();
    let path = dir.path().join("tmax1_20200601.nc");
    grid_writer::NetCdfWriter::new().write_grid(&path, &grid).unwrap();

    let file = netcdf::open(&path).unwrap();
    let lat: Vec<f64> = file.variable("lat").unwrap().get_values(..).unwrap();
    assert_eq!(lat.first(), Some(&7.5));
    let values: Vec<f32> = file.variable("tmaxone").unwrap().get_values(..).unwrap();
    // First stored row is the southern edge, the last north-up row.
    assert_eq!(values[0], north_up[(h - 1) * w]);
}

#[test]
fn test_writer_config_from_yaml() {
    let config: WriterConfig = serde_yaml::from_str("workers: 3\nformat: netcdf\n").unwrap();
    assert_eq!(config.workers, 3);
    assert_eq!(config.format, OutputFormat::NetCdf);

    let config: WriterConfig = serde_yaml::from_str("workers: 1\n").unwrap();
    assert_eq!(config.format, OutputFormat::GeoTiff);
}

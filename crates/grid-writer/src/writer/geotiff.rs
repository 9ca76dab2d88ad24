//! GeoTIFF output.
//!
//! A grid becomes one image of 64-bit float samples. A single day is a plain
//! one-band raster; several days become one band per day, stored planar
//! (`PlanarConfiguration = 2`, one strip per band) so GDAL reads them as bands
//! of a single raster. The image carries:
//!
//! - `ModelPixelScale` and `ModelTiepoint` from the affine transform, tie
//!   point at the upper-left corner of pixel (0, 0)
//! - `GeoKeyDirectory`: geographic model, pixel-is-area, EPSG code
//! - `GDAL_NODATA`: the parameter's fill value
//! - `GDAL_METADATA`: parameter, units, long name and per-band dates

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use grd_parser::DecodedGrid;
use tiff::encoder::{colortype, DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::{
    CompressionMethod, PhotometricInterpretation, PlanarConfiguration, SampleFormat, Tag,
};
use tiff::TiffResult;
use tracing::debug;

use crate::error::{WriterError, WriterResult};
use crate::writer::{GridWriter, OutputFormat};

/// Private GDAL tag without a named variant in the tiff crate.
const GDAL_METADATA: u16 = 42112;

// GeoKey ids and values
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Writes float64 GeoTIFFs, one band per time step.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffWriter;

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self
    }
}

impl GridWriter for GeoTiffWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::GeoTiff
    }

    fn write_grid(&self, path: &Path, grid: &DecodedGrid) -> WriterResult<()> {
        let result = write_raster(path, grid);
        if result.is_err() {
            let _ = std::fs::remove_file(path);
        }
        result
    }
}

/// Georeferencing tags shared by every image.
struct GeoTags {
    pixel_scale: [f64; 3],
    tiepoint: [f64; 6],
    geo_keys: [u16; 16],
    nodata: String,
    metadata: String,
}

impl GeoTags {
    fn write<W: Write + Seek, K: TiffKind>(
        &self,
        dir: &mut DirectoryEncoder<'_, W, K>,
    ) -> TiffResult<()> {
        dir.write_tag(Tag::ModelPixelScaleTag, &self.pixel_scale[..])?;
        dir.write_tag(Tag::ModelTiepointTag, &self.tiepoint[..])?;
        dir.write_tag(Tag::GeoKeyDirectoryTag, &self.geo_keys[..])?;
        dir.write_tag(Tag::from_u16_exhaustive(GDAL_METADATA), self.metadata.as_str())?;
        dir.write_tag(Tag::GdalNodata, self.nodata.as_str())
    }
}

fn write_raster(path: &Path, grid: &DecodedGrid) -> WriterResult<()> {
    let transform = &grid.georef.transform;
    if !transform.is_north_up() {
        return Err(WriterError::InvalidGrid(
            "GeoTIFF export needs a north-up transform".to_string(),
        ));
    }
    if grid.time_count == 0 || grid.time_count > u16::MAX as usize {
        return Err(WriterError::InvalidGrid(format!(
            "cannot write {} bands",
            grid.time_count
        )));
    }

    let width = grid.lon_count as u32;
    let height = grid.lat_count as u32;
    let tags = GeoTags {
        pixel_scale: [transform.a, -transform.e, 0.0],
        tiepoint: [0.0, 0.0, 0.0, transform.c, transform.f, 0.0],
        geo_keys: geo_key_directory(grid.georef.crs.epsg()),
        nodata: nodata_string(grid.fill_value),
        metadata: gdal_metadata(grid),
    };

    let mut file = File::create(path).map_err(|e| WriterError::io(path, e))?;
    {
        let mut encoder = TiffEncoder::new(&mut file)?;
        if grid.time_count == 1 {
            write_single_band(&mut encoder, grid, width, height, &tags)?;
        } else {
            write_planar_bands(&mut encoder, grid, width, height, &tags)?;
        }
    }
    file.sync_all().map_err(|e| WriterError::io(path, e))?;

    debug!(
        path = %path.display(),
        bands = grid.time_count,
        width,
        height,
        "Wrote GeoTIFF"
    );
    Ok(())
}

fn band_values(grid: &DecodedGrid, band: usize) -> WriterResult<Vec<f64>> {
    grid.export_slice(band)
        .ok_or_else(|| WriterError::InvalidGrid(format!("missing time step {band}")))
}

fn write_single_band<W: Write + Seek>(
    encoder: &mut TiffEncoder<W>,
    grid: &DecodedGrid,
    width: u32,
    height: u32,
    tags: &GeoTags,
) -> WriterResult<()> {
    let values = band_values(grid, 0)?;
    let mut image = encoder.new_image::<colortype::Gray64Float>(width, height)?;
    tags.write(image.encoder())?;
    image.write_data(&values)?;
    Ok(())
}

/// One IFD, one strip per band, bands in time order.
fn write_planar_bands<W: Write + Seek>(
    encoder: &mut TiffEncoder<W>,
    grid: &DecodedGrid,
    width: u32,
    height: u32,
    tags: &GeoTags,
) -> WriterResult<()> {
    let bands = grid.time_count;
    let mut dir = encoder.new_directory()?;

    let mut offsets = Vec::with_capacity(bands);
    let mut byte_counts = Vec::with_capacity(bands);
    for band in 0..bands {
        let values = band_values(grid, band)?;
        let offset = dir.write_data(&values[..])?;
        offsets.push(strip_field(offset)?);
        byte_counts.push(strip_field((values.len() * std::mem::size_of::<f64>()) as u64)?);
    }

    dir.write_tag(Tag::ImageWidth, width)?;
    dir.write_tag(Tag::ImageLength, height)?;
    dir.write_tag(Tag::BitsPerSample, &vec![64u16; bands][..])?;
    dir.write_tag(Tag::Compression, CompressionMethod::None.to_u16())?;
    dir.write_tag(
        Tag::PhotometricInterpretation,
        PhotometricInterpretation::BlackIsZero.to_u16(),
    )?;
    dir.write_tag(Tag::StripOffsets, &offsets[..])?;
    dir.write_tag(Tag::SamplesPerPixel, bands as u16)?;
    dir.write_tag(Tag::RowsPerStrip, height)?;
    dir.write_tag(Tag::StripByteCounts, &byte_counts[..])?;
    dir.write_tag(Tag::PlanarConfiguration, PlanarConfiguration::Planar.to_u16())?;
    // Bands past the first are unspecified extra samples of a grey image.
    dir.write_tag(Tag::ExtraSamples, &vec![0u16; bands - 1][..])?;
    dir.write_tag(Tag::SampleFormat, &vec![SampleFormat::IEEEFP.to_u16(); bands][..])?;
    tags.write(&mut dir)?;
    dir.finish()?;
    Ok(())
}

/// Classic TIFF stores strip offsets and sizes as 32-bit values.
fn strip_field(value: u64) -> WriterResult<u32> {
    u32::try_from(value)
        .map_err(|_| WriterError::InvalidGrid("GeoTIFF larger than 4 GiB".to_string()))
}

/// GeoKeyDirectory for a geographic CRS with pixel-is-area rasters.
fn geo_key_directory(epsg: u16) -> [u16; 16] {
    [
        1, 1, 0, 3, // version 1.1.0, three keys
        GT_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC,
        GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA,
        GEOGRAPHIC_TYPE, 0, 1, epsg,
    ]
}

/// Nodata as GDAL expects it: the exact value masked cells are exported as.
pub(crate) fn nodata_string(fill_value: f32) -> String {
    (fill_value as f64).to_string()
}

fn gdal_metadata(grid: &DecodedGrid) -> String {
    let mut xml = String::from("<GDALMetadata>");
    let dataset = [
        ("parameter", grid.parameter.id()),
        ("units", grid.units),
        ("long_name", grid.long_name),
    ];
    for (name, value) in dataset {
        xml.push_str(&format!("<Item name=\"{name}\">{}</Item>", escape_xml(value)));
    }
    // Single-day files keep a dataset-level date; bands carry their own.
    match grid.dates.as_slice() {
        [date] => xml.push_str(&format!("<Item name=\"date\">{date}</Item>")),
        dates => {
            for (band, date) in dates.iter().enumerate() {
                xml.push_str(&format!(
                    "<Item name=\"date\" sample=\"{band}\" role=\"description\">{date}</Item>"
                ));
            }
        }
    }
    xml.push_str("</GDALMetadata>");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

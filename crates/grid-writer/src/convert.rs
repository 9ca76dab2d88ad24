//! Parallel conversion of cached raw files.
//!
//! Each day is an independent job on a dedicated rayon pool. Jobs report back
//! over an mpsc channel, so one bad file never stops its siblings. Range files
//! decode their days in parallel on the same pool and stack whatever decoded.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use chrono::NaiveDate;
use grd_parser::{decode_file, DecodedGrid};
use imd_common::{range_filename, DateWindow, GridFileRef, ParameterSpec};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::WriterConfig;
use crate::error::{WriterError, WriterResult};
use crate::writer::{writer_for, GridWriter, OutputFormat};

/// How days map to output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertMode {
    /// One output file per day.
    #[default]
    PerDay,
    /// All days stacked along a time axis in one file.
    SingleFile,
}

/// Result of converting one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub date: NaiveDate,
    pub status: ConversionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    Converted(PathBuf),
    Failed(String),
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self.status, ConversionStatus::Converted(_))
    }
}

/// Runs conversions on its own thread pool.
pub struct Converter {
    pool: ThreadPool,
    config: WriterConfig,
}

impl Converter {
    /// Create a converter with `config.workers` threads.
    pub fn new(config: WriterConfig) -> WriterResult<Self> {
        config.validate().map_err(WriterError::Config)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("imd-convert-{i}"))
            .build()
            .map_err(|e| WriterError::ThreadPool(e.to_string()))?;
        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Convert the given raw files into `out_dir`.
    ///
    /// Outcomes are sorted by date. Per-file problems are reported as
    /// [`ConversionStatus::Failed`]; only setup problems (unknown format,
    /// unusable output directory) return `Err`.
    pub fn convert(
        &self,
        spec: &'static ParameterSpec,
        files: &[GridFileRef],
        out_dir: &Path,
        format: OutputFormat,
        mode: ConvertMode,
    ) -> WriterResult<Vec<ConversionOutcome>> {
        let writer = writer_for(format)?;
        std::fs::create_dir_all(out_dir).map_err(|e| WriterError::io(out_dir, e))?;

        if files.is_empty() {
            return Ok(Vec::new());
        }

        let mut files = files.to_vec();
        files.sort_by_key(|f| f.date);

        let outcomes = match mode {
            ConvertMode::PerDay => self.convert_per_day(spec, files, out_dir, writer),
            ConvertMode::SingleFile => self
                .pool
                .install(|| convert_single_file(spec, &files, out_dir, writer.as_ref())),
        };

        let converted = outcomes.iter().filter(|o| o.is_converted()).count();
        info!(
            parameter = %spec.parameter,
            format = %format,
            mode = ?mode,
            converted,
            failed = outcomes.len() - converted,
            "Conversion finished"
        );
        Ok(outcomes)
    }

    /// Convert whatever raw files of `window` already exist in `raw_dir`.
    pub fn convert_cached(
        &self,
        spec: &'static ParameterSpec,
        window: &DateWindow,
        raw_dir: &Path,
        out_dir: &Path,
        format: OutputFormat,
        mode: ConvertMode,
    ) -> WriterResult<Vec<ConversionOutcome>> {
        let files: Vec<GridFileRef> = window
            .dates()
            .map(|date| GridFileRef::new(spec, date, raw_dir))
            .filter(|f| f.local_path.is_file())
            .collect();

        let missing = window.total_days() - files.len();
        if missing > 0 {
            warn!(
                parameter = %spec.parameter,
                missing,
                "Some days of the window are not cached"
            );
        }

        self.convert(spec, &files, out_dir, format, mode)
    }

    fn convert_per_day(
        &self,
        spec: &'static ParameterSpec,
        files: Vec<GridFileRef>,
        out_dir: &Path,
        writer: Arc<dyn GridWriter>,
    ) -> Vec<ConversionOutcome> {
        let (tx, rx) = mpsc::channel();

        for file in files {
            let tx = tx.clone();
            let writer = Arc::clone(&writer);
            let out_dir = out_dir.to_path_buf();
            self.pool.spawn(move || {
                let outcome = convert_day(spec, &file, &out_dir, writer.as_ref());
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut outcomes: Vec<ConversionOutcome> = rx.iter().collect();
        outcomes.sort_by_key(|o| o.date);
        outcomes
    }
}

#[instrument(skip_all, fields(parameter = %spec.parameter, date = %file.date))]
fn convert_day(
    spec: &ParameterSpec,
    file: &GridFileRef,
    out_dir: &Path,
    writer: &dyn GridWriter,
) -> ConversionOutcome {
    let out_path = out_dir.join(spec.local_filename(file.date, writer.format().file_kind()));

    let result = decode_file(spec, &file.local_path)
        .and_then(|grid| grid.with_dates(vec![file.date]))
        .map_err(WriterError::from)
        .and_then(|grid| writer.write_grid(&out_path, &grid));

    ConversionOutcome {
        date: file.date,
        status: match result {
            Ok(()) => ConversionStatus::Converted(out_path),
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                ConversionStatus::Failed(e.to_string())
            }
        },
    }
}

/// `files` must be sorted by date.
///
/// Each day is decoded on its own; days that fail are reported and left out
/// of the stack, and the file is named after the days it actually holds.
fn convert_single_file(
    spec: &ParameterSpec,
    files: &[GridFileRef],
    out_dir: &Path,
    writer: &dyn GridWriter,
) -> Vec<ConversionOutcome> {
    let decoded: Vec<_> = files
        .par_iter()
        .map(|f| {
            let grid = decode_file(spec, &f.local_path).and_then(|g| g.with_dates(vec![f.date]));
            (f.date, grid)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(files.len());
    let mut days = Vec::with_capacity(files.len());
    for (date, grid) in decoded {
        match grid {
            Ok(grid) => days.push(grid),
            Err(e) => {
                warn!(parameter = %spec.parameter, %date, error = %e, "Leaving day out of range file");
                outcomes.push(ConversionOutcome {
                    date,
                    status: ConversionStatus::Failed(e.to_string()),
                });
            }
        }
    }

    let dates: Vec<NaiveDate> = days.iter().flat_map(|g| g.dates.iter().copied()).collect();
    let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
        return outcomes;
    };
    let out_path = out_dir.join(range_filename(spec, first, last, writer.format().file_kind()));

    let result = DecodedGrid::stack(days)
        .map_err(WriterError::from)
        .and_then(|grid| writer.write_grid(&out_path, &grid));

    let status = match result {
        Ok(()) => ConversionStatus::Converted(out_path),
        Err(e) => {
            warn!(parameter = %spec.parameter, error = %e, "Range conversion failed");
            ConversionStatus::Failed(e.to_string())
        }
    };

    outcomes.extend(dates.into_iter().map(|date| ConversionOutcome {
        date,
        status: status.clone(),
    }));
    outcomes.sort_by_key(|o| o.date);
    outcomes
}

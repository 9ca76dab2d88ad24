//! Concurrent per-day download engine.
//!
//! Key properties:
//! - Idempotent: a day whose local file exists is never fetched again
//! - Atomic writes: payloads land in a hidden `.partial` file, are fsynced and
//!   then renamed, so a local file is either complete or absent
//! - Per-day accounting: every requested day yields exactly one outcome
//! - Cancellable: days not yet started are recorded as cancelled

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use futures::{stream, StreamExt};
use imd_common::{DateWindow, GridFileRef, ImdError, Parameter, ParameterSpec};
use metrics::counter;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::fetch::{FetchResponse, Fetcher};
use crate::progress::{NoProgress, ProgressObserver};

/// Configuration for the download engine.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of days fetched at once
    pub max_concurrent: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

/// Why a day could not be made available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The remote has no file for this day.
    NotFound,
    /// Transport failure or unexpected response.
    Remote(String),
    /// The payload could not be written locally.
    Io(String),
    /// The batch was cancelled before this day started.
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => f.write_str("not found on remote"),
            FailureReason::Remote(msg) => write!(f, "remote error: {msg}"),
            FailureReason::Io(msg) => write!(f, "write failed: {msg}"),
            FailureReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The local file existed before this run.
    AlreadyPresent,
    /// Fetched and written in this run.
    Fetched,
    Failed(FailureReason),
}

impl DownloadStatus {
    /// Days in the skipped set are never handed to the decoder.
    pub fn is_skipped(&self) -> bool {
        !matches!(self, DownloadStatus::Fetched)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadStatus::Failed(_))
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            DownloadStatus::AlreadyPresent => "already_present",
            DownloadStatus::Fetched => "fetched",
            DownloadStatus::Failed(FailureReason::NotFound) => "not_found",
            DownloadStatus::Failed(FailureReason::Remote(_)) => "remote_error",
            DownloadStatus::Failed(FailureReason::Io(_)) => "io_error",
            DownloadStatus::Failed(FailureReason::Cancelled) => "cancelled",
        }
    }
}

/// Result for one requested day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub date: NaiveDate,
    /// Local filename, e.g. `rain_20200624.grd`
    pub filename: String,
    pub status: DownloadStatus,
}

/// Aggregate result of one batch.
///
/// `outcomes` are in completion order. `skipped_filenames` holds the local
/// names of every day that was already present or failed, sorted.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub parameter: Parameter,
    pub total_days: usize,
    pub outcomes: Vec<DownloadOutcome>,
    pub skipped_filenames: Vec<String>,
}

impl DownloadResult {
    pub fn new(parameter: Parameter, total_days: usize, outcomes: Vec<DownloadOutcome>) -> Self {
        let mut skipped_filenames: Vec<String> = outcomes
            .iter()
            .filter(|o| o.status.is_skipped())
            .map(|o| o.filename.clone())
            .collect();
        skipped_filenames.sort();

        Self {
            parameter,
            total_days,
            outcomes,
            skipped_filenames,
        }
    }

    pub fn skipped_dates(&self) -> BTreeSet<NaiveDate> {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_skipped())
            .map(|o| o.date)
            .collect()
    }

    /// True if `date` must not be converted. Dates outside the batch count
    /// as skipped.
    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.outcomes
            .iter()
            .find(|o| o.date == date)
            .map_or(true, |o| o.status.is_skipped())
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_filenames.len()
    }

    pub fn fetched_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DownloadStatus::Fetched)
            .count()
    }

    pub fn already_present_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == DownloadStatus::AlreadyPresent)
            .count()
    }

    pub fn failed(&self) -> Vec<&DownloadOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failed()).collect()
    }

    /// Days eligible for conversion.
    pub fn available_count(&self) -> usize {
        self.total_days - self.skipped_count()
    }

    pub fn all_skipped(&self) -> bool {
        self.skipped_count() == self.total_days
    }

    pub fn all_failed(&self) -> bool {
        self.failed().len() == self.total_days
    }
}

/// Drives concurrent per-day fetches through a [`Fetcher`].
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: DownloadConfig) -> Self {
        let config = DownloadConfig {
            max_concurrent: config.max_concurrent.max(1),
        };
        Self { fetcher, config }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download every day of `window` into `base_dir`.
    pub async fn download_range(
        &self,
        spec: &ParameterSpec,
        window: &DateWindow,
        base_dir: &Path,
    ) -> Result<DownloadResult> {
        self.download_range_with(spec, window, base_dir, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Like [`Downloader::download_range`], reporting progress and honouring
    /// `cancel`.
    ///
    /// Only a missing or non-directory `base_dir` is an error; everything that
    /// happens to a single day is recorded in its outcome.
    #[instrument(skip_all, fields(parameter = %spec.parameter, start = %window.start(), end = %window.end()))]
    pub async fn download_range_with(
        &self,
        spec: &ParameterSpec,
        window: &DateWindow,
        base_dir: &Path,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult> {
        if !base_dir.is_dir() {
            return Err(ImdError::InvalidPath(base_dir.display().to_string()).into());
        }

        let total = window.total_days();
        info!(
            total_days = total,
            max_concurrent = self.config.max_concurrent,
            "Starting download"
        );

        let mut completed = 0;
        let outcomes: Vec<DownloadOutcome> = stream::iter(window.dates())
            .map(|date| {
                let file = GridFileRef::new(spec, date, base_dir);
                self.download_day(spec, file, cancel)
            })
            .buffer_unordered(self.config.max_concurrent)
            .inspect(|_| {
                completed += 1;
                observer.on_progress(completed, total);
            })
            .collect()
            .await;

        let result = DownloadResult::new(spec.parameter, total, outcomes);
        info!(
            fetched = result.fetched_count(),
            already_present = result.already_present_count(),
            failed = result.failed().len(),
            "Download finished"
        );
        Ok(result)
    }

    #[instrument(skip_all, fields(date = %file.date))]
    async fn download_day(
        &self,
        spec: &ParameterSpec,
        file: GridFileRef,
        cancel: &CancellationToken,
    ) -> DownloadOutcome {
        let status = self.fetch_day(&file, cancel).await;

        counter!("imd_downloads_total", "outcome" => status.label()).increment(1);
        match &status {
            DownloadStatus::Failed(reason) => warn!(
                parameter = %spec.parameter,
                url = %file.remote_url,
                reason = %reason,
                "Day unavailable"
            ),
            status => debug!(filename = %file.local_filename, status = status.label(), "Day done"),
        }

        DownloadOutcome {
            date: file.date,
            filename: file.local_filename,
            status,
        }
    }

    async fn fetch_day(&self, file: &GridFileRef, cancel: &CancellationToken) -> DownloadStatus {
        if is_file(&file.local_path).await {
            return DownloadStatus::AlreadyPresent;
        }

        // Cancellation only stops new fetches; cached days still count.
        if cancel.is_cancelled() {
            return DownloadStatus::Failed(FailureReason::Cancelled);
        }

        match self.fetcher.fetch(&file.remote_url).await {
            FetchResponse::Success(body) if body.is_empty() => {
                DownloadStatus::Failed(FailureReason::Remote("empty response body".to_string()))
            }
            FetchResponse::Success(body) => match write_atomic(&file.local_path, &body).await {
                Ok(()) => {
                    counter!("imd_download_bytes_total").increment(body.len() as u64);
                    DownloadStatus::Fetched
                }
                Err(e) => DownloadStatus::Failed(FailureReason::Io(e.to_string())),
            },
            FetchResponse::NotFound => DownloadStatus::Failed(FailureReason::NotFound),
            FetchResponse::Error(msg) => DownloadStatus::Failed(FailureReason::Remote(msg)),
        }
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Unique hidden temp name next to `path`.
fn partial_path(path: &Path) -> std::path::PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.{count}.partial", std::process::id()))
}

/// Write `bytes` so that `path` is either complete or untouched.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let temp_path = partial_path(path);

    let result = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&temp_path).await;
    }
    result
}

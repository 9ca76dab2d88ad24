//! One download request from validation to conversion.
//!
//! A [`SessionRequest`] is checked completely before anything is fetched: an
//! unknown parameter, a bad date or a missing directory never causes a
//! network call. [`Session`] then runs the batch and keeps its result so that
//! later conversion only sees days fetched in this run.

use std::path::{Path, PathBuf};

use grid_writer::{ConversionOutcome, ConvertMode, Converter, OutputFormat};
use imd_common::{DateWindow, GridFileRef, ImdError, Parameter, ParameterSpec};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::UnavailablePolicy;
use crate::download::{DownloadResult, Downloader};
use crate::error::{DownloadError, Result};
use crate::progress::{NoProgress, ProgressObserver};

/// A validated request.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    spec: &'static ParameterSpec,
    window: DateWindow,
    download_dir: PathBuf,
}

impl SessionRequest {
    /// Validate parameter, dates and download directory, in that order.
    pub fn new(
        parameter: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
        download_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let spec = ParameterSpec::lookup(parameter)?;
        let window = DateWindow::resolve(spec, start_date, end_date)?;

        let download_dir = download_dir.as_ref();
        if !download_dir.is_dir() {
            return Err(ImdError::InvalidPath(download_dir.display().to_string()).into());
        }

        Ok(Self {
            spec,
            window,
            download_dir: download_dir.to_path_buf(),
        })
    }

    pub fn spec(&self) -> &'static ParameterSpec {
        self.spec
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

/// A finished download batch and the conversions it allows.
#[derive(Debug)]
pub struct Session {
    request: SessionRequest,
    result: DownloadResult,
}

impl Session {
    /// Run the batch without progress reporting.
    pub async fn download(
        downloader: &Downloader,
        request: SessionRequest,
        policy: UnavailablePolicy,
    ) -> Result<Self> {
        Self::download_with(downloader, request, policy, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Run the batch, then apply `policy` to decide whether anything usable
    /// came out of it.
    pub async fn download_with(
        downloader: &Downloader,
        request: SessionRequest,
        policy: UnavailablePolicy,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let result = downloader
            .download_range_with(
                request.spec,
                &request.window,
                &request.download_dir,
                observer,
                cancel,
            )
            .await?;

        if policy.is_unavailable(&result) {
            return Err(DownloadError::AllDownloadsUnavailable {
                parameter: request.spec.id(),
            });
        }

        Ok(Self { request, result })
    }

    pub fn parameter(&self) -> Parameter {
        self.request.spec.parameter
    }

    pub fn spec(&self) -> &'static ParameterSpec {
        self.request.spec
    }

    pub fn window(&self) -> &DateWindow {
        &self.request.window
    }

    pub fn download_dir(&self) -> &Path {
        &self.request.download_dir
    }

    pub fn result(&self) -> &DownloadResult {
        &self.result
    }

    /// Number of days fetched in this run and therefore eligible for
    /// conversion.
    pub fn len(&self) -> usize {
        self.result.available_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid resolution, e.g. `"0.25 degree(s)"`.
    pub fn px_size(&self) -> String {
        self.request.spec.px_size_label()
    }

    /// Raw files that may be decoded, in date order. Skipped days are never
    /// included.
    pub fn eligible_files(&self) -> Vec<GridFileRef> {
        self.request
            .window
            .dates()
            .filter(|date| !self.result.is_skipped(*date))
            .map(|date| GridFileRef::new(self.request.spec, date, &self.request.download_dir))
            .collect()
    }

    /// Convert the eligible days into `out_dir`.
    pub fn convert(
        &self,
        converter: &Converter,
        out_dir: &Path,
        format: OutputFormat,
        mode: ConvertMode,
    ) -> Result<Vec<ConversionOutcome>> {
        let files = self.eligible_files();
        info!(
            parameter = %self.parameter(),
            eligible = files.len(),
            skipped = self.result.skipped_count(),
            "Converting session"
        );
        Ok(converter.convert(self.request.spec, &files, out_dir, format, mode)?)
    }
}

//! IMD daily grid downloader.
//!
//! Fetches the daily `.grd` files published by IMD Pune for a parameter and
//! date window, keeps a local cache that re-runs never fetch twice, and hands
//! freshly fetched days to the conversion pool.
//!
//! ```text
//! SessionRequest::new ──► Session::download ──► Downloader ──► Fetcher (HTTP)
//!   (validate, no I/O)         │                   │
//!                              │                   └─► .partial ─► rename
//!                              ▼
//!                       Session::convert ──► grid_writer::Converter
//! ```

pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod progress;
pub mod session;

pub use config::{DownloadSettings, ImdConfig, UnavailablePolicy};
pub use download::{
    DownloadConfig, DownloadOutcome, DownloadResult, DownloadStatus, Downloader, FailureReason,
};
pub use error::{DownloadError, Result};
pub use fetch::{FetchResponse, Fetcher, HttpConfig, HttpFetcher};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use session::{Session, SessionRequest};

pub use tokio_util::sync::CancellationToken;

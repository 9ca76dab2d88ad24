//! Configuration for the conversion pool.

use serde::{Deserialize, Serialize};

use crate::writer::OutputFormat;

/// Configuration for grid conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Number of rayon worker threads.
    pub workers: usize,

    /// Format used when the caller does not pick one.
    pub format: OutputFormat,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            format: OutputFormat::GeoTiff,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl WriterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("IMD_CONVERT_WORKERS") {
            if let Ok(workers) = val.parse() {
                config.workers = workers;
            }
        }

        if let Ok(val) = std::env::var("IMD_OUTPUT_FORMAT") {
            if let Ok(format) = val.parse() {
                config.format = format;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be > 0".to_string());
        }
        Ok(())
    }
}

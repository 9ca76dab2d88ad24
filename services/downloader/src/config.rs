//! Configuration file loading.
//!
//! An optional YAML file with `download` and `convert` sections. Command-line
//! flags override anything set here.
//!
//! ```yaml
//! download:
//!   max_concurrent: 8
//!   max_retries: 3
//!   request_timeout_secs: 60
//!   unavailable_policy: all_failed
//! convert:
//!   workers: 4
//!   format: geotiff
//! ```

use std::path::Path;
use std::time::Duration;

use grid_writer::WriterConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::download::{DownloadConfig, DownloadResult};
use crate::error::{DownloadError, Result};
use crate::fetch::HttpConfig;

/// When a finished batch counts as "nothing available".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailablePolicy {
    /// Only when every requested day failed. Days that were already on disk
    /// count as available.
    #[default]
    AllFailed,
    /// When every requested day was skipped, including days already on disk.
    AllSkipped,
}

impl UnavailablePolicy {
    pub fn is_unavailable(&self, result: &DownloadResult) -> bool {
        match self {
            UnavailablePolicy::AllFailed => result.all_failed(),
            UnavailablePolicy::AllSkipped => result.all_skipped(),
        }
    }
}

/// Root of the YAML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImdConfig {
    pub download: DownloadSettings,
    pub convert: WriterConfig,
}

/// `download` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: Option<String>,
    pub unavailable_policy: UnavailablePolicy,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            max_concurrent: DownloadConfig::default().max_concurrent,
            max_retries: http.max_retries,
            initial_retry_delay_ms: http.initial_retry_delay.as_millis() as u64,
            max_retry_delay_secs: http.max_retry_delay.as_secs(),
            request_timeout_secs: http.request_timeout.as_secs(),
            connect_timeout_secs: http.connect_timeout.as_secs(),
            user_agent: None,
            unavailable_policy: UnavailablePolicy::default(),
        }
    }
}

impl DownloadSettings {
    pub fn http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            max_retries: self.max_retries,
            initial_retry_delay: Duration::from_millis(self.initial_retry_delay_ms),
            max_retry_delay: Duration::from_secs(self.max_retry_delay_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            max_concurrent: self.max_concurrent,
        }
    }
}

impl ImdConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DownloadError::io(path, e))?;
        let config = Self::from_yaml(&content).map_err(|e| {
            DownloadError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ImdConfig =
            serde_yaml::from_str(content).map_err(|e| DownloadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent == 0 {
            return Err(DownloadError::Config("download.max_concurrent must be > 0".to_string()));
        }
        self.convert
            .validate()
            .map_err(|e| DownloadError::Config(format!("convert: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DownloadOutcome, DownloadStatus, FailureReason};
    use chrono::NaiveDate;
    use grid_writer::OutputFormat;
    use imd_common::Parameter;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
download:
  max_concurrent: 8
  max_retries: 5
  request_timeout_secs: 30
  user_agent: "research-bot/1.0"
  unavailable_policy: all_skipped
convert:
  workers: 2
  format: netcdf
"#;
        let config = ImdConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.download.max_concurrent, 8);
        assert_eq!(config.download.unavailable_policy, UnavailablePolicy::AllSkipped);
        assert_eq!(config.convert.workers, 2);
        assert_eq!(config.convert.format, OutputFormat::NetCdf);

        let http = config.download.http_config();
        assert_eq!(http.max_retries, 5);
        assert_eq!(http.request_timeout, Duration::from_secs(30));
        assert_eq!(http.user_agent, "research-bot/1.0");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ImdConfig::from_yaml("{}").unwrap();
        assert_eq!(config.download.unavailable_policy, UnavailablePolicy::AllFailed);
        assert!(config.download.max_concurrent > 0);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = ImdConfig::from_yaml("download:\n  max_concurrent: 0\n").unwrap_err();
        assert!(matches!(err, DownloadError::Config(_)));
    }

    #[test]
    fn test_policies() {
        let day = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let present = DownloadResult::new(
            Parameter::Rain,
            1,
            vec![DownloadOutcome {
                date: day,
                filename: "rain_20200601.grd".to_string(),
                status: DownloadStatus::AlreadyPresent,
            }],
        );
        assert!(!UnavailablePolicy::AllFailed.is_unavailable(&present));
        assert!(UnavailablePolicy::AllSkipped.is_unavailable(&present));

        let missing = DownloadResult::new(
            Parameter::Rain,
            1,
            vec![DownloadOutcome {
                date: day,
                filename: "rain_20200601.grd".to_string(),
                status: DownloadStatus::Failed(FailureReason::NotFound),
            }],
        );
        assert!(UnavailablePolicy::AllFailed.is_unavailable(&missing));
        assert!(UnavailablePolicy::AllSkipped.is_unavailable(&missing));
    }
}

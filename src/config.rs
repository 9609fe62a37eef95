use crate::error::{ProcmonError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The config directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "procmon";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_SAMPLING_SECS: u64 = 5;
pub const DEFAULT_REPORTS_DIR: &str = "output/reports";
pub const DEFAULT_LOGS_DIR: &str = "output/logs";

/// Timestamp layout used in report and log file names.
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

// ============================================================================
// File defaults
// ============================================================================

/// Optional defaults read from a TOML file.
///
/// Every field may be omitted; command-line flags always win over these.
///
/// # Example
///
/// ```toml
/// sampling = 2
/// reports_dir = "/var/tmp/procmon/reports"
/// logs_dir = "/var/tmp/procmon/logs"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDefaults {
    #[serde(default)]
    pub sampling: Option<u64>,
    #[serde(default)]
    pub reports_dir: Option<PathBuf>,
    #[serde(default)]
    pub logs_dir: Option<PathBuf>,
}

/// Returns the default config file location (`<config_dir>/procmon/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load defaults from `path`.
///
/// A missing file is not an error and yields empty defaults.
pub fn load_file_defaults(path: &Path) -> Result<FileDefaults> {
    if !path.exists() {
        return Ok(FileDefaults::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ProcmonError::ConfigurationInvalid(format!(
            "Failed to read config file at {:?}: {}",
            path, e
        ))
    })?;

    toml::from_str(&content).map_err(|e| {
        ProcmonError::ConfigurationInvalid(format!(
            "Failed to parse config file at {:?}: {}",
            path, e
        ))
    })
}

/// Load defaults from an explicit path, or from the default location when none is given.
pub fn resolve_file_defaults(explicit: Option<&Path>) -> Result<FileDefaults> {
    match explicit {
        Some(path) if !path.exists() => Err(ProcmonError::ConfigurationInvalid(format!(
            "Config file {} does not exist",
            path.display()
        ))),
        Some(path) => load_file_defaults(path),
        None => match default_config_path() {
            Some(path) => load_file_defaults(&path),
            None => Ok(FileDefaults::default()),
        },
    }
}

// ============================================================================
// Monitoring configuration
// ============================================================================

/// Immutable settings for one monitoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringConfig {
    pub process_name: String,
    /// Total monitoring window in seconds.
    pub duration: u64,
    /// Seconds between two samples.
    pub sampling: u64,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Captured once at startup; names the report and log files.
    pub reference_datetime: DateTime<Local>,
}

impl MonitoringConfig {
    pub fn new(process_name: impl Into<String>, duration: u64, sampling: u64) -> Self {
        Self {
            process_name: process_name.into(),
            duration,
            sampling,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            reference_datetime: Local::now(),
        }
    }

    /// Build a config from command-line values, filling gaps from file defaults.
    pub fn from_sources(
        process_name: String,
        duration: u64,
        sampling: Option<u64>,
        reports_dir: Option<PathBuf>,
        logs_dir: Option<PathBuf>,
        defaults: FileDefaults,
    ) -> Self {
        Self {
            process_name,
            duration,
            sampling: sampling
                .or(defaults.sampling)
                .unwrap_or(DEFAULT_SAMPLING_SECS),
            reports_dir: reports_dir
                .or(defaults.reports_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
            logs_dir: logs_dir
                .or(defaults.logs_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR)),
            reference_datetime: Local::now(),
        }
    }

    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    pub fn with_logs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = dir.into();
        self
    }

    pub fn with_reference_datetime(mut self, datetime: DateTime<Local>) -> Self {
        self.reference_datetime = datetime;
        self
    }

    /// Check the settings before any monitoring starts.
    pub fn validate(&self) -> Result<()> {
        if self.process_name.trim().is_empty() {
            return Err(ProcmonError::ConfigurationInvalid(
                "The process name must not be empty.".to_string(),
            ));
        }

        if self.sampling == 0 {
            return Err(ProcmonError::ConfigurationInvalid(
                "The sampling interval must be at least one second.".to_string(),
            ));
        }

        if self.sampling > self.duration {
            return Err(ProcmonError::ConfigurationInvalid(
                "The sampling interval should be lower than the total duration.".to_string(),
            ));
        }

        if !self.reports_dir.is_dir() {
            return Err(ProcmonError::ConfigurationInvalid(format!(
                "Report directory {} does not exist or is not a valid directory.",
                self.reports_dir.display()
            )));
        }

        if !self.logs_dir.is_dir() {
            return Err(ProcmonError::ConfigurationInvalid(format!(
                "Logs directory {} does not exist or is not a valid directory.",
                self.logs_dir.display()
            )));
        }

        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    pub fn sampling_interval(&self) -> Duration {
        Duration::from_secs(self.sampling)
    }

    fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            self.process_name,
            self.reference_datetime.format(FILE_TIMESTAMP_FORMAT)
        )
    }

    pub fn log_file_name(&self) -> String {
        format!("{}.log", self.file_stem())
    }

    pub fn log_path(&self) -> PathBuf {
        self.logs_dir.join(self.log_file_name())
    }

    pub fn csv_report_path(&self) -> PathBuf {
        self.reports_dir.join(format!("{}.csv", self.file_stem()))
    }
}

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod output;
pub mod process;
pub mod report;
pub mod signal;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::MonitoringConfig;
pub use error::{ProcmonError, Result};
pub use monitor::{Monitor, MonitorState, Sample, SampleStore};

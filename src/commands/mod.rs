//! CLI command handlers for procmon.
//!
//! - [`monitor`] - Sample one process for a fixed duration and write the CSV report

mod monitor;

pub use monitor::monitor_command;

//! Monitor command handler.
//!
//! Wires the real OS provider, Ctrl+C handling and console output around a
//! [`Monitor`] run.

use tracing::warn;

use crate::config::MonitoringConfig;
use crate::error::{ProcmonError, Result};
use crate::monitor::Monitor;
use crate::output::{print_info, print_interrupted, print_report_written, print_warning};
use crate::signal::SignalHandler;

/// Monitor the configured process until its window closes.
///
/// An interrupted run still counts as a success: the samples collected so
/// far are written and the user is told so.
///
/// # Returns
///
/// * `Ok(())` when the window closed or the user interrupted the run
/// * `Err(ProcmonError)` when the process was missing, vanished, or a
///   reading or the report write failed
pub fn monitor_command(config: MonitoringConfig) -> Result<()> {
    let report_path = config.csv_report_path();
    print_info(&format!(
        "Monitoring {} for {}s, sampling every {}s (log: {})",
        config.process_name,
        config.duration,
        config.sampling,
        config.log_path().display()
    ));

    let mut monitor = Monitor::system(config);
    match SignalHandler::new() {
        Ok(handler) => monitor = monitor.with_shutdown_handler(handler),
        Err(e) => {
            warn!("{}", e);
            print_warning("Ctrl+C will stop monitoring without saving the report.");
        }
    }

    let result = monitor.run();

    if report_path.is_file() {
        print_report_written(&report_path, monitor.store().len());
    }

    match result {
        Err(ProcmonError::Interrupted) => {
            print_interrupted();
            Ok(())
        }
        other => other,
    }
}

//! procmon CLI entry point.
//!
//! Parses command-line arguments, sets up logging and runs the monitor.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use procmon::commands::monitor_command;
use procmon::config::{resolve_file_defaults, MonitoringConfig};
use procmon::error::Result;
use procmon::logging;
use procmon::output::print_error;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "procmon")]
#[command(
    version,
    about = "Process resources monitoring application",
    after_help = "EXAMPLES:
    # Sample firefox every 5 seconds for 10 minutes
    procmon -p firefox -d 600

    # Sample every second for a minute, reports in /tmp
    procmon -p nginx -d 60 -s 1 -r /tmp -l /tmp

OUTPUT:
    A table row is printed for every sample with the average and current
    CPU %, private memory and handle/file-descriptor count. Rows gain a
    warning once memory has kept growing over at least 10 samples.
    The full series is written to <reports-dir>/<process>_<timestamp>.csv.

CONFIG FILE:
    Defaults for --sampling, --reports-dir and --logs-dir can be set in
    ~/.config/procmon/config.toml (or the file given with --config):

        sampling = 5
        reports_dir = \"output/reports\"
        logs_dir = \"output/logs\""
)]
struct Cli {
    /// Process name
    #[arg(short, long)]
    process: String,

    /// Overall duration of the monitoring (in seconds)
    #[arg(short, long)]
    duration: u64,

    /// Sampling interval (in seconds) [default: 5]
    #[arg(short, long)]
    sampling: Option<u64>,

    /// Report directory to store CSV [default: output/reports]
    #[arg(short, long)]
    reports_dir: Option<PathBuf>,

    /// Logs directory [default: output/logs]
    #[arg(short, long)]
    logs_dir: Option<PathBuf>,

    /// TOML file with default settings
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<MonitoringConfig> {
        let defaults = resolve_file_defaults(self.config.as_deref())?;
        let config = MonitoringConfig::from_sources(
            self.process,
            self.duration,
            self.sampling,
            self.reports_dir,
            self.logs_dir,
            defaults,
        );
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    // Flushes the log file on drop, keep it until main returns
    let _log_guard = match logging::init(&config.logs_dir, &config.log_file_name()) {
        Ok(guard) => guard,
        Err(e) => {
            print_error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match monitor_command(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_expected() {
                error!("{}", e);
            } else {
                error!("Unexpected failure: {:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "procmon", "-p", "pycharm", "-d", "60", "-s", "2", "-r", "reports", "-l", "logs",
        ])
        .unwrap();

        assert_eq!(cli.process, "pycharm");
        assert_eq!(cli.duration, 60);
        assert_eq!(cli.sampling, Some(2));
        assert_eq!(cli.reports_dir, Some(PathBuf::from("reports")));
        assert_eq!(cli.logs_dir, Some(PathBuf::from("logs")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_long_flags() {
        let cli = Cli::try_parse_from([
            "procmon",
            "--process",
            "nginx",
            "--duration",
            "30",
            "--reports-dir",
            "/tmp/r",
            "--logs-dir",
            "/tmp/l",
            "--config",
            "/tmp/procmon.toml",
        ])
        .unwrap();

        assert_eq!(cli.process, "nginx");
        assert_eq!(cli.duration, 30);
        assert!(cli.sampling.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/procmon.toml")));
    }

    #[test]
    fn test_process_is_required() {
        assert!(Cli::try_parse_from(["procmon", "-d", "10"]).is_err());
    }

    #[test]
    fn test_duration_is_required() {
        assert!(Cli::try_parse_from(["procmon", "-p", "nginx"]).is_err());
    }

    #[test]
    fn test_duration_must_be_a_number() {
        assert!(Cli::try_parse_from(["procmon", "-p", "nginx", "-d", "soon"]).is_err());
    }

    #[test]
    fn test_into_config_uses_config_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("procmon.toml");
        fs::write(
            &config_path,
            format!(
                "sampling = 3\nreports_dir = {:?}\nlogs_dir = {:?}\n",
                temp_dir.path(),
                temp_dir.path()
            ),
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "procmon",
            "-p",
            "nginx",
            "-d",
            "9",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        let config = cli.into_config().unwrap();
        assert_eq!(config.sampling, 3);
        assert_eq!(config.reports_dir, temp_dir.path());
    }

    #[test]
    fn test_into_config_rejects_sampling_above_duration() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let empty_config = temp_dir.path().join("empty.toml");
        fs::write(&empty_config, "").unwrap();

        let cli = Cli::try_parse_from([
            "procmon",
            "-p",
            "nginx",
            "-d",
            "5",
            "-s",
            "10",
            "-r",
            dir,
            "-l",
            dir,
            "--config",
            empty_config.to_str().unwrap(),
        ])
        .unwrap();

        assert!(cli.into_config().is_err());
    }
}

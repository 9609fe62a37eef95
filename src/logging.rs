//! Tracing setup: a detailed log file per run plus warnings on stderr.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ProcmonError, Result};

/// Default filter for the log file; `RUST_LOG` overrides it.
const DEFAULT_FILE_FILTER: &str = "debug";

fn file_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .parse_lossy(directives.unwrap_or(DEFAULT_FILE_FILTER))
}

/// Install the global subscriber.
///
/// Everything from DEBUG up goes to `<dir>/<file_name>`; WARN and above is
/// also echoed on stderr. The returned guard flushes the file writer when
/// dropped, so keep it alive until the process exits.
pub fn init(dir: &Path, file_name: &str) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let rust_log = std::env::var("RUST_LOG").ok();

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(file_filter(rust_log.as_deref()));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ProcmonError::Logging(e.to_string()))?;

    Ok(guard)
}

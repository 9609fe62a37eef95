//! CSV persistence of the sample series.

use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::monitor::Sample;

pub const CSV_HEADER: [&str; 4] = ["timestamp", "cpu_percent", "private_memory", "handles_fds"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

#[derive(Debug, Serialize)]
struct CsvRow {
    timestamp: String,
    cpu_percent: f64,
    private_memory: u64,
    handles_fds: u64,
}

impl From<&Sample> for CsvRow {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            cpu_percent: sample.cpu_percent,
            private_memory: sample.private_memory_bytes,
            handles_fds: sample.handle_count,
        }
    }
}

/// Write every sample to `path`, replacing any existing file.
///
/// The header row is written even when there are no samples.
pub fn write_csv_report(path: &Path, samples: &[Sample]) -> Result<()> {
    info!("Persist results to {}", path.display());

    // serde-driven headers only appear with the first record
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for sample in samples {
        writer.serialize(CsvRow::from(sample))?;
    }
    writer.flush()?;

    Ok(())
}

//! Append-only sample history with running averages.

use chrono::{DateTime, Local};

/// One reading of the monitored process.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    /// Rounded to 2 decimals at capture.
    pub cpu_percent: f64,
    pub private_memory_bytes: u64,
    pub handle_count: u64,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Local>,
        cpu_percent: f64,
        private_memory_bytes: u64,
        handle_count: u64,
    ) -> Self {
        Self {
            timestamp,
            cpu_percent: round2(cpu_percent),
            private_memory_bytes,
            handle_count,
        }
    }
}

/// Round half away from zero to 2 decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of every numeric field over all stored samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub cpu_percent: f64,
    pub private_memory_bytes: f64,
    pub handle_count: f64,
}

/// Samples in capture order.
///
/// Sums are kept alongside the samples so averaging does not rescan
/// the history on every tick.
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: Vec<Sample>,
    cpu_sum: f64,
    memory_sum: u128,
    handle_sum: u128,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.cpu_sum += sample.cpu_percent;
        self.memory_sum += u128::from(sample.private_memory_bytes);
        self.handle_sum += u128::from(sample.handle_count);
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Private memory readings in capture order.
    pub fn memory_series(&self) -> Vec<u64> {
        self.samples
            .iter()
            .map(|sample| sample.private_memory_bytes)
            .collect()
    }

    /// Running averages, or `None` before the first sample.
    pub fn averages(&self) -> Option<Averages> {
        if self.samples.is_empty() {
            return None;
        }

        let count = self.samples.len() as f64;
        Some(Averages {
            cpu_percent: self.cpu_sum / count,
            private_memory_bytes: self.memory_sum as f64 / count,
            handle_count: self.handle_sum as f64 / count,
        })
    }
}

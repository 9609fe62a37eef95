//! Test doubles shared across modules.
//!
//! [`FakeProvider`] hands out scripted process handles and records how they
//! are used; [`FakeClock`] advances only when slept on, so scheduling runs
//! instantly and deterministically.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone};

use crate::error::{ProcmonError, Result};
use crate::monitor::Clock;
use crate::process::{ProcessEntry, ProcessHandle, ProcessProvider};

const DEFAULT_MEMORY: u64 = 10 * 1024 * 1024;

/// Scripted readings for a fake process.
///
/// Value lists are consumed one reading at a time; once exhausted the last
/// value repeats.
#[derive(Debug, Clone, Default)]
pub struct FakeProcess {
    pub cpu_values: Vec<f64>,
    pub memory_values: Vec<u64>,
    pub fd_count: u64,
    pub handle_count: u64,
    /// CPU reads that succeed before the process is reported gone.
    pub alive_cpu_reads: Option<usize>,
    /// 1-based memory read that fails with an unexpected error.
    pub failing_memory_read: Option<usize>,
}

/// How often each reading was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub cpu_reads: usize,
    pub memory_reads: usize,
    pub fd_reads: usize,
    pub handle_reads: usize,
}

fn nth_or_last<T: Copy>(values: &[T], n: usize, fallback: T) -> T {
    values
        .get(n)
        .or_else(|| values.last())
        .copied()
        .unwrap_or(fallback)
}

pub struct FakeProvider {
    entries: Vec<ProcessEntry>,
    process: FakeProcess,
    attached: Vec<u32>,
    calls: Rc<RefCell<Calls>>,
}

impl FakeProvider {
    pub fn new(entries: Vec<ProcessEntry>, process: FakeProcess) -> Self {
        Self {
            entries,
            process,
            attached: Vec::new(),
            calls: Rc::new(RefCell::new(Calls::default())),
        }
    }

    pub fn attached_pids(&self) -> Vec<u32> {
        self.attached.clone()
    }

    pub fn calls(&self) -> Calls {
        *self.calls.borrow()
    }
}

impl ProcessProvider for FakeProvider {
    type Handle = FakeHandle;

    fn processes(&mut self) -> Result<Vec<ProcessEntry>> {
        Ok(self.entries.clone())
    }

    fn attach(&mut self, entry: &ProcessEntry) -> Result<FakeHandle> {
        self.attached.push(entry.pid);
        Ok(FakeHandle {
            pid: entry.pid,
            name: entry.name.clone(),
            process: self.process.clone(),
            calls: Rc::clone(&self.calls),
        })
    }
}

pub struct FakeHandle {
    pid: u32,
    name: String,
    process: FakeProcess,
    calls: Rc<RefCell<Calls>>,
}

impl ProcessHandle for FakeHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn cpu_percent(&mut self) -> Result<f64> {
        let read = {
            let mut calls = self.calls.borrow_mut();
            calls.cpu_reads += 1;
            calls.cpu_reads
        };

        if self.process.alive_cpu_reads.is_some_and(|alive| read > alive) {
            return Err(ProcmonError::ProcessGone {
                name: self.name.clone(),
                pid: self.pid,
            });
        }

        Ok(nth_or_last(&self.process.cpu_values, read - 1, 0.0))
    }

    fn private_memory_bytes(&mut self) -> Result<u64> {
        let read = {
            let mut calls = self.calls.borrow_mut();
            calls.memory_reads += 1;
            calls.memory_reads
        };

        if self.process.failing_memory_read == Some(read) {
            return Err(ProcmonError::Metrics("permission denied".to_string()));
        }

        Ok(nth_or_last(
            &self.process.memory_values,
            read - 1,
            DEFAULT_MEMORY,
        ))
    }

    fn handle_count(&mut self) -> Result<u64> {
        self.calls.borrow_mut().handle_reads += 1;
        Ok(self.process.handle_count)
    }

    fn fd_count(&mut self) -> Result<u64> {
        self.calls.borrow_mut().fd_reads += 1;
        Ok(self.process.fd_count)
    }
}

/// A clock that only moves when slept on.
#[derive(Debug)]
pub struct FakeClock {
    start: DateTime<Local>,
    elapsed: Duration,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Local.with_ymd_and_hms(2024, 2, 10, 17, 20, 0).unwrap(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start
    }
}

impl Clock for FakeClock {
    fn monotonic(&self) -> Duration {
        self.elapsed
    }

    fn sleep(&mut self, duration: Duration) {
        self.elapsed += duration;
    }

    fn now(&self) -> DateTime<Local> {
        self.start + TimeDelta::milliseconds(self.elapsed.as_millis() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_clock_advances_only_on_sleep() {
        let mut clock = FakeClock::new();
        assert_eq!(clock.monotonic(), Duration::ZERO);
        assert_eq!(clock.now(), clock.start_time());

        clock.sleep(Duration::from_secs(3));
        assert_eq!(clock.monotonic(), Duration::from_secs(3));
        assert_eq!((clock.now() - clock.start_time()).num_seconds(), 3);
    }

    #[test]
    fn test_nth_or_last() {
        assert_eq!(nth_or_last(&[1, 2, 3], 1, 0), 2);
        assert_eq!(nth_or_last(&[1, 2, 3], 9, 0), 3);
        assert_eq!(nth_or_last::<u64>(&[], 0, 7), 7);
    }
}

//! Process lookup and per-process metric readings.
//!
//! The monitoring loop only talks to the [`ProcessProvider`] and
//! [`ProcessHandle`] traits. [`SystemProvider`] implements them on top of
//! `sysinfo` and the platform's own counters.

mod system;

pub use system::{SystemProcess, SystemProvider};

use crate::error::{ProcmonError, Result};

/// A process seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
}

impl ProcessEntry {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Which per-process resource counter is reported in the handle/FD column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Windows kernel object handles.
    Handles,
    /// POSIX open file descriptors.
    FileDescriptors,
}

impl DescriptorKind {
    /// Pick the counter for the host OS.
    pub fn detect() -> Self {
        if cfg!(windows) {
            DescriptorKind::Handles
        } else {
            DescriptorKind::FileDescriptors
        }
    }
}

/// Source of running processes.
pub trait ProcessProvider {
    type Handle: ProcessHandle;

    /// All currently running processes, in enumeration (PID) order.
    fn processes(&mut self) -> Result<Vec<ProcessEntry>>;

    /// Bind a handle to an enumerated process.
    fn attach(&mut self, entry: &ProcessEntry) -> Result<Self::Handle>;

    /// Bind the first process whose name is exactly `name`.
    ///
    /// Fails with [`ProcmonError::ProcessNotFound`] once the whole
    /// enumeration has been scanned without a match.
    fn find_process(&mut self, name: &str) -> Result<Self::Handle> {
        let entry = self
            .processes()?
            .into_iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ProcmonError::ProcessNotFound(name.to_string()))?;

        self.attach(&entry)
    }
}

/// A live process bound for repeated readings.
///
/// Every reading fails with [`ProcmonError::ProcessGone`] once the
/// underlying OS process has exited.
pub trait ProcessHandle {
    fn pid(&self) -> u32;

    fn name(&self) -> &str;

    /// CPU utilization since the previous call on this handle.
    ///
    /// The first call has nothing to compare against and reports 0.
    fn cpu_percent(&mut self) -> Result<f64>;

    /// Memory owned exclusively by the process (unique set size), in bytes.
    fn private_memory_bytes(&mut self) -> Result<u64>;

    /// Open handle count (Windows).
    fn handle_count(&mut self) -> Result<u64>;

    /// Open file descriptor count (POSIX).
    fn fd_count(&mut self) -> Result<u64>;

    /// Read the counter selected by `kind`.
    fn descriptor_count(&mut self, kind: DescriptorKind) -> Result<u64> {
        match kind {
            DescriptorKind::Handles => self.handle_count(),
            DescriptorKind::FileDescriptors => self.fd_count(),
        }
    }
}

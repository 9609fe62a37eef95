//! Process resource readings using sysinfo.
//!
//! CPU usage comes from sysinfo. Private memory and descriptor counts come
//! from procfs on Linux and from the platform's own counters elsewhere.

#[cfg(not(target_os = "linux"))]
use std::io;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use super::{ProcessEntry, ProcessHandle, ProcessProvider};
use crate::error::{ProcmonError, Result};

/// Enumerates running processes through sysinfo.
pub struct SystemProvider {
    system: System,
}

impl SystemProvider {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProvider for SystemProvider {
    type Handle = SystemProcess;

    fn processes(&mut self) -> Result<Vec<ProcessEntry>> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let mut entries: Vec<ProcessEntry> = self
            .system
            .processes()
            .iter()
            // Linux reports threads as tasks alongside their process
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                ProcessEntry::new(pid.as_u32(), process.name().to_string_lossy())
            })
            .collect();

        entries.sort_by_key(|entry| entry.pid);
        Ok(entries)
    }

    fn attach(&mut self, entry: &ProcessEntry) -> Result<SystemProcess> {
        Ok(SystemProcess::new(entry.pid, entry.name.clone()))
    }
}

/// A single process tracked by PID.
///
/// Holds its own `sysinfo::System` so CPU usage is measured between two
/// consecutive calls on this handle only.
pub struct SystemProcess {
    system: System,
    pid: Pid,
    name: String,
}

impl SystemProcess {
    pub fn new(pid: u32, name: String) -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(pid),
            name,
        }
    }

    fn gone(&self) -> ProcmonError {
        ProcmonError::ProcessGone {
            name: self.name.clone(),
            pid: self.pid.as_u32(),
        }
    }

    /// Map an OS read failure, treating a missing process as gone.
    #[cfg(not(target_os = "linux"))]
    fn read_error(&self, what: &str, err: io::Error) -> ProcmonError {
        if err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(ESRCH) {
            self.gone()
        } else {
            ProcmonError::Metrics(format!(
                "{} for pid {}: {}",
                what,
                self.pid.as_u32(),
                err
            ))
        }
    }

    /// Map a procfs failure, treating a missing `/proc/<pid>` as gone.
    #[cfg(target_os = "linux")]
    fn proc_error(&self, what: &str, err: procfs::ProcError) -> ProcmonError {
        match err {
            procfs::ProcError::NotFound(_) => self.gone(),
            other => ProcmonError::Metrics(format!(
                "{} for pid {}: {}",
                what,
                self.pid.as_u32(),
                other
            )),
        }
    }

    fn refresh(&mut self, kind: ProcessRefreshKind) -> Result<&sysinfo::Process> {
        self.system
            .refresh_processes_specifics(ProcessesToUpdate::Some(&[self.pid]), true, kind);

        let gone = self.gone();
        self.system.process(self.pid).ok_or(gone)
    }
}

#[cfg(not(target_os = "linux"))]
const ESRCH: i32 = 3;

impl ProcessHandle for SystemProcess {
    fn pid(&self) -> u32 {
        self.pid.as_u32()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn cpu_percent(&mut self) -> Result<f64> {
        let process = self.refresh(ProcessRefreshKind::nothing().with_cpu())?;
        Ok(f64::from(process.cpu_usage()))
    }

    fn private_memory_bytes(&mut self) -> Result<u64> {
        #[cfg(target_os = "linux")]
        {
            linux::unique_set_size(self.pid.as_u32())
                .map_err(|e| self.proc_error("reading smaps_rollup", e))
        }
        #[cfg(not(target_os = "linux"))]
        {
            let process = self.refresh(ProcessRefreshKind::nothing().with_memory())?;
            Ok(process.memory())
        }
    }

    fn handle_count(&mut self) -> Result<u64> {
        #[cfg(windows)]
        {
            windows::handle_count(self.pid.as_u32())
                .map_err(|e| self.read_error("querying handle count", e))
        }
        #[cfg(not(windows))]
        {
            Err(ProcmonError::Unsupported("Handle count"))
        }
    }

    fn fd_count(&mut self) -> Result<u64> {
        #[cfg(target_os = "linux")]
        {
            linux::fd_count(self.pid.as_u32())
                .map_err(|e| self.proc_error("listing file descriptors", e))
        }
        #[cfg(target_os = "macos")]
        {
            use std::process::Command;

            // Probe first so a vanished pid surfaces as gone, not as zero rows
            self.refresh(ProcessRefreshKind::nothing())?;
            let output = Command::new("lsof")
                .args(["-p", &self.pid.as_u32().to_string()])
                .output()
                .map_err(|e| self.read_error("running lsof", e))?;

            let rows = output
                .stdout
                .split(|&b| b == b'\n')
                .filter(|line| !line.is_empty())
                .count() as u64;
            // first row is the column header
            Ok(rows.saturating_sub(1))
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            Err(ProcmonError::Unsupported("File descriptor count"))
        }
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::collections::HashMap;

    use procfs::process::Process;
    use procfs::ProcResult;

    /// smaps fields that count pages mapped by this process alone.
    const PRIVATE_FIELDS: [&str; 3] = ["Private_Clean", "Private_Dirty", "Private_Hugetlb"];

    /// Unique set size in bytes, summed from `/proc/<pid>/smaps_rollup`.
    pub fn unique_set_size(pid: u32) -> ProcResult<u64> {
        let rollup = Process::new(pid as i32)?.smaps_rollup()?;
        Ok(rollup
            .memory_map_rollup
            .into_iter()
            .map(|map| private_bytes(&map.extension.map))
            .sum())
    }

    pub fn fd_count(pid: u32) -> ProcResult<u64> {
        Ok(Process::new(pid as i32)?.fd_count()? as u64)
    }

    /// procfs already converts the kB figures to bytes.
    pub fn private_bytes(fields: &HashMap<String, u64>) -> u64 {
        PRIVATE_FIELDS
            .iter()
            .filter_map(|key| fields.get(*key))
            .sum()
    }
}

#[cfg(windows)]
mod windows {
    use std::io;

    use windows_sys::Win32::Foundation::CloseHandle;
    use windows_sys::Win32::System::Threading::{
        GetProcessHandleCount, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    };

    pub fn handle_count(pid: u32) -> io::Result<u64> {
        // SAFETY: the handle is checked for null and closed before returning.
        unsafe {
            let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }

            let mut count: u32 = 0;
            let ok = GetProcessHandleCount(handle, &mut count);
            let err = io::Error::last_os_error();
            CloseHandle(handle);

            if ok == 0 {
                return Err(err);
            }
            Ok(u64::from(count))
        }
    }
}

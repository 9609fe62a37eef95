//! The sampling loop.
//!
//! A [`Monitor`] binds the configured process, samples it on a fixed grid
//! for the configured duration, prints one table row per sample and always
//! writes the CSV report at the end, whichever way sampling stopped.

mod leak;
mod schedule;
mod store;

pub use leak::{has_potential_memory_leak, LEAK_WARNING, MIN_SAMPLES};
pub use schedule::{Clock, Schedule, SystemClock};
pub use store::{Averages, Sample, SampleStore};

use std::io::{self, Write};

use tracing::{debug, error, info, warn};

use crate::config::MonitoringConfig;
use crate::error::{ProcmonError, Result};
use crate::output::table::{format_row, write_header};
use crate::process::{DescriptorKind, ProcessHandle, ProcessProvider, SystemProvider};
use crate::report::write_csv_report;
use crate::signal::SignalHandler;

/// Lifecycle of a monitoring run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Created,
    Resolving,
    Running,
    Finalizing,
    Terminated,
}

/// Samples one process and reports on it.
pub struct Monitor<P: ProcessProvider, C: Clock, W: Write> {
    config: MonitoringConfig,
    provider: P,
    clock: C,
    out: W,
    descriptor_kind: DescriptorKind,
    shutdown: Option<SignalHandler>,
    handle: Option<P::Handle>,
    store: SampleStore,
    state: MonitorState,
    leak_reported: bool,
}

impl Monitor<SystemProvider, SystemClock, io::Stdout> {
    /// A monitor over the real OS, printing to stdout.
    pub fn system(config: MonitoringConfig) -> Self {
        Monitor::new(config, SystemProvider::new(), SystemClock::new(), io::stdout())
    }
}

impl<P: ProcessProvider, C: Clock, W: Write> Monitor<P, C, W> {
    pub fn new(config: MonitoringConfig, provider: P, clock: C, out: W) -> Self {
        Self {
            config,
            provider,
            clock,
            out,
            descriptor_kind: DescriptorKind::detect(),
            shutdown: None,
            handle: None,
            store: SampleStore::new(),
            state: MonitorState::Created,
            leak_reported: false,
        }
    }

    /// Override the host-detected handle/FD counter.
    pub fn with_descriptor_kind(mut self, kind: DescriptorKind) -> Self {
        self.descriptor_kind = kind;
        self
    }

    /// Stop sampling early once `handler` reports a shutdown request.
    pub fn with_shutdown_handler(mut self, handler: SignalHandler) -> Self {
        self.shutdown = Some(handler);
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// PID of the bound process, once resolved.
    pub fn bound_pid(&self) -> Option<u32> {
        self.handle.as_ref().map(|handle| handle.pid())
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn transition_to(&mut self, state: MonitorState) {
        debug!("Monitor state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Resolve the process, sample until the window closes, then persist.
    ///
    /// The CSV report is written exactly once on every path. A failure
    /// raised while resolving or sampling is returned after the report has
    /// been written; if writing the report fails too, the sampling failure
    /// wins and the write failure is logged.
    pub fn run(&mut self) -> Result<()> {
        self.transition_to(MonitorState::Resolving);
        let outcome = match self.resolve() {
            Ok(()) => {
                self.transition_to(MonitorState::Running);
                self.sample_until_done()
            }
            Err(e) => Err(e),
        };

        self.transition_to(MonitorState::Finalizing);
        let persisted = self.persist();
        self.transition_to(MonitorState::Terminated);

        match (outcome, persisted) {
            (Err(e), Err(write_err)) => {
                error!("Failed to persist report after failure: {}", write_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), persisted) => persisted,
        }
    }

    /// Bind the first process named like the configured one.
    ///
    /// The handle's CPU reading is primed once, since the first reading
    /// has no previous measurement to compare against.
    pub fn resolve(&mut self) -> Result<()> {
        info!(
            "Retrieve running process {} information",
            self.config.process_name
        );

        let mut handle = self.provider.find_process(&self.config.process_name)?;
        handle.cpu_percent()?;

        info!("Process has been found with PID {}", handle.pid());
        self.handle = Some(handle);
        Ok(())
    }

    fn sample_until_done(&mut self) -> Result<()> {
        let mut schedule = Schedule::new(
            self.config.sampling_interval(),
            self.config.duration(),
            self.clock.monotonic(),
        );

        info!(
            "Scheduling the monitoring for {} seconds with sampling every {} seconds ({} samples)",
            self.config.duration,
            self.config.sampling,
            schedule.planned_ticks()
        );

        while !schedule.is_exhausted() {
            if self
                .shutdown
                .as_ref()
                .is_some_and(SignalHandler::is_shutdown_requested)
            {
                warn!(
                    "Shutdown requested after {} of {} samples",
                    schedule.fired(),
                    schedule.planned_ticks()
                );
                return Err(ProcmonError::Interrupted);
            }

            let now = self.clock.monotonic();
            if schedule.poll(now) {
                self.tick()?;
                continue;
            }

            self.clock.sleep(schedule.wait_before_next_poll(now));
        }

        info!("Monitoring window closed after {} samples", schedule.fired());
        Ok(())
    }

    /// Take one sample, store it and print its table row.
    pub fn tick(&mut self) -> Result<()> {
        debug!("Retrieve process metrics");

        let timestamp = self.clock.now();
        let handle = self.handle.as_mut().ok_or_else(|| {
            ProcmonError::Metrics("sampling requested before a process was bound".to_string())
        })?;

        let cpu_percent = handle.cpu_percent()?;
        let private_memory_bytes = handle.private_memory_bytes()?;
        let handle_count = handle.descriptor_count(self.descriptor_kind)?;

        let sample = Sample::new(timestamp, cpu_percent, private_memory_bytes, handle_count);
        self.store.push(sample.clone());

        let averages = self
            .store
            .averages()
            .ok_or_else(|| ProcmonError::Metrics("no samples to average".to_string()))?;

        if self.store.len() == 1 {
            write_header(&mut self.out)?;
        }

        let mut row = format_row(&sample, &averages);
        if self.leak_suspected() {
            row.push_str(LEAK_WARNING);
        }
        writeln!(self.out, "{}", row)?;
        self.out.flush()?;

        Ok(())
    }

    fn leak_suspected(&mut self) -> bool {
        let suspected = has_potential_memory_leak(&self.store.memory_series());
        if suspected && !self.leak_reported {
            warn!(
                "Potential memory leak in {}: private memory kept growing over {} samples",
                self.config.process_name,
                self.store.len()
            );
        }
        self.leak_reported = suspected;
        suspected
    }

    fn persist(&mut self) -> Result<()> {
        write_csv_report(&self.config.csv_report_path(), self.store.samples())
    }
}

//! Fixed-interval tick scheduling driven by elapsed time.
//!
//! The loop polls a [`Schedule`] at most [`POLL_INTERVAL`] apart and never
//! sleeps past the next boundary, so per-poll overhead does not build up
//! and a slow tick delays the next poll without shifting the tick grid.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::warn;

/// Longest wait between two polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Time source for the monitoring loop.
pub trait Clock {
    /// Monotonic time since an arbitrary fixed origin.
    fn monotonic(&self) -> Duration;

    /// Block the calling thread.
    fn sleep(&mut self, duration: Duration);

    /// Wall-clock time, used for sample timestamps.
    fn now(&self) -> DateTime<Local>;
}

/// The real clock.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Tick grid of `interval, 2*interval, ...` up to and including `total`.
///
/// Tick `k` becomes due at the first poll where the elapsed time reaches
/// `k * interval`. Boundaries already passed when a tick fires are skipped,
/// so an overrun never produces a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    total: Duration,
    started: Duration,
    next_tick: Duration,
    fired: u64,
}

impl Schedule {
    /// Start the grid at `started` (a [`Clock::monotonic`] reading).
    pub fn new(interval: Duration, total: Duration, started: Duration) -> Self {
        Self {
            interval,
            total,
            started,
            next_tick: interval,
            fired: 0,
        }
    }

    /// Number of ticks the whole window holds.
    pub fn planned_ticks(&self) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }
        (self.total.as_nanos() / self.interval.as_nanos()) as u64
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// No tick remains inside the window.
    pub fn is_exhausted(&self) -> bool {
        self.interval.is_zero() || self.next_tick > self.total
    }

    /// How long to wait at monotonic time `now` before the next poll.
    ///
    /// Capped at [`POLL_INTERVAL`] so shutdown requests are still seen
    /// promptly during long intervals.
    pub fn wait_before_next_poll(&self, now: Duration) -> Duration {
        let elapsed = now.saturating_sub(self.started);
        self.next_tick
            .saturating_sub(elapsed)
            .min(POLL_INTERVAL)
    }

    /// Whether a tick is due at monotonic time `now`; consumes it if so.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.is_exhausted() {
            return false;
        }

        let elapsed = now.saturating_sub(self.started);
        if elapsed < self.next_tick {
            return false;
        }

        self.fired += 1;
        self.next_tick += self.interval;

        let mut skipped = 0;
        while self.next_tick <= elapsed && self.next_tick <= self.total {
            self.next_tick += self.interval;
            skipped += 1;
        }
        if skipped > 0 {
            warn!(
                "Sampling fell behind by {} interval(s), skipping missed ticks",
                skipped
            );
        }

        true
    }
}

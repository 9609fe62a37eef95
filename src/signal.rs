//! Ctrl+C handling for the monitoring loop.
//!
//! Pressing Ctrl+C does not kill the run outright: the loop notices the
//! flag at its next poll, stops sampling and still writes the CSV report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{ProcmonError, Result};

/// Shared flag set when SIGINT is received.
///
/// Cheap to clone; all clones observe the same flag.
#[derive(Clone, Debug)]
pub struct SignalHandler {
    shutdown_flag: Arc<AtomicBool>,
}

impl SignalHandler {
    /// Registers the process-wide SIGINT handler.
    ///
    /// # Errors
    ///
    /// `ctrlc` accepts a single registration per process; a second call
    /// returns [`ProcmonError::SignalHandler`].
    pub fn new() -> Result<Self> {
        let handler = Self::unregistered();
        let flag_clone = Arc::clone(&handler.shutdown_flag);

        ctrlc::set_handler(move || {
            flag_clone.store(true, Ordering::SeqCst);
        })
        .map_err(|e| ProcmonError::SignalHandler(e.to_string()))?;

        Ok(handler)
    }

    /// A flag that no OS signal will set; only [`request_shutdown`](Self::request_shutdown) does.
    pub fn unregistered() -> Self {
        Self {
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Non-blocking check of the flag.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_starts_clear() {
        let handler = SignalHandler::unregistered();
        assert!(!handler.is_shutdown_requested());
    }

    #[test]
    fn test_request_shutdown_sets_flag() {
        let handler = SignalHandler::unregistered();
        handler.request_shutdown();
        assert!(handler.is_shutdown_requested());
    }

    #[test]
    fn test_clone_shares_state() {
        let handler1 = SignalHandler::unregistered();
        let handler2 = handler1.clone();

        assert!(!handler2.is_shutdown_requested());
        handler1.request_shutdown();
        assert!(handler2.is_shutdown_requested());
    }

    #[test]
    fn test_flag_visible_across_threads() {
        let handler = SignalHandler::unregistered();
        let remote = handler.clone();

        std::thread::spawn(move || remote.request_shutdown())
            .join()
            .unwrap();

        assert!(handler.is_shutdown_requested());
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcmonError {
    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("No running process {0} was found")]
    ProcessNotFound(String),

    #[error("Process {name} with pid {pid} is not running, application will stop")]
    ProcessGone { name: String, pid: u32 },

    #[error("Monitoring interrupted")]
    Interrupted,

    #[error("Failed to read process metrics: {0}")]
    Metrics(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Failed to register signal handler: {0}")]
    SignalHandler(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ProcmonError {
    /// Whether this failure is one of the anticipated ways a run ends.
    ///
    /// Anything else is an unexpected failure and gets logged with full detail.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ProcmonError::ProcessNotFound(_)
                | ProcmonError::ProcessGone { .. }
                | ProcmonError::Interrupted
                | ProcmonError::ConfigurationInvalid(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProcmonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_not_found_message() {
        let err = ProcmonError::ProcessNotFound("pycharm".to_string());
        assert_eq!(err.to_string(), "No running process pycharm was found");
    }

    #[test]
    fn test_process_gone_message_names_pid() {
        let err = ProcmonError::ProcessGone {
            name: "pycharm".to_string(),
            pid: 1234,
        };
        assert_eq!(
            err.to_string(),
            "Process pycharm with pid 1234 is not running, application will stop"
        );
    }

    #[test]
    fn test_expected_failures() {
        assert!(ProcmonError::ProcessNotFound("x".into()).is_expected());
        assert!(ProcmonError::Interrupted.is_expected());
        assert!(!ProcmonError::Metrics("boom".into()).is_expected());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!ProcmonError::from(io).is_expected());
    }
}

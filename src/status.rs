//! Exit status codes for the CLI
//!
//! - 0: Success
//! - 1: Any error, including any response that came back as an error
//! - 130: User interrupted (Ctrl+C, standard SIGINT exit code)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    /// Failed command, transport error or 4xx/5xx response
    Error = 1,
    /// User interrupted (Ctrl+C) - standard SIGINT code
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Fold the outcome of one more response into a run's status
    pub fn with_response(self, is_error: bool) -> Self {
        match self {
            ExitStatus::Success if is_error => ExitStatus::Error,
            other => other,
        }
    }
}

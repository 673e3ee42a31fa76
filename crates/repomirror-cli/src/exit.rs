//! Process exit codes

use repomirror_engine::RunOutcome;
use repomirror_types::{Error, ErrorKind};
use std::process::ExitCode;

/// How the process ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The repositories are in sync
    Synchronized,
    /// Anything not classified below
    Failure,
    /// The configuration could not be loaded or is unusable
    Config,
    /// A local file or directory could not be accessed
    LocalAccess,
    /// Connecting to or listing the remote repository failed
    Remote,
    /// The once-per-day gate skipped the run
    Skipped,
    /// The run completed but the report shows differences
    NotInSync,
    /// The operator stopped the run
    UserAbort,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> u8 {
        match self {
            Self::Synchronized => 0,
            Self::Failure => 1,
            Self::Config => 2,
            Self::LocalAccess => 3,
            Self::Remote => 4,
            Self::Skipped => 5,
            Self::NotInSync => 6,
            Self::UserAbort => 130,
        }
    }

    /// Status for a run that returned normally
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Skipped => Self::Skipped,
            RunOutcome::Aborted { .. } => Self::UserAbort,
            RunOutcome::Completed {
                synchronized: true, ..
            } => Self::Synchronized,
            RunOutcome::Completed { .. } => Self::NotInSync,
        }
    }

    /// Status for an error that escaped the run
    pub fn from_error(error: &Error) -> Self {
        match error.kind() {
            ErrorKind::Config => Self::Config,
            ErrorKind::LocalFileAccess => Self::LocalAccess,
            ErrorKind::Connection | ErrorKind::Listing => Self::Remote,
            ErrorKind::UserAbort => Self::UserAbort,
            ErrorKind::Download | ErrorKind::Other => Self::Failure,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

//! Error types and handling for repomirror
//!
//! This module provides the single error taxonomy shared by every stage of a
//! mirror run. Errors carry a kind (used by the binary to pick an exit code)
//! and a severity (used to decide whether a stage may downgrade the error to
//! a report item).

use std::path::Path;

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - the run ends cleanly
    Low,
    /// Medium severity - a single file is affected, siblings continue
    Medium,
    /// High severity - the current stage cannot continue
    High,
    /// Critical severity - the run cannot start or continue at all
    Critical,
}

/// Main error type for repomirror operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Connecting or authenticating to the remote server failed
    #[error("Connection error: {message}")]
    Connection {
        /// Error message describing the connection issue
        message: String,
    },

    /// Listing the remote directory or querying a remote hash failed
    #[error("Directory listing error: {message}")]
    Listing {
        /// Error message describing the listing issue
        message: String,
    },

    /// Downloading a single file failed
    #[error("Download of '{name}' failed: {message}")]
    Download {
        /// Remote file name
        name: String,
        /// Error message describing the download issue
        message: String,
    },

    /// The resume pass after a failed download failed as well
    #[error("Resume of '{name}' failed: {message}")]
    ResumeFailed {
        /// Remote file name
        name: String,
        /// Error message describing the resume issue
        message: String,
    },

    /// A local file or directory could not be accessed
    #[error("Local file access error: {message}")]
    LocalFileAccess {
        /// Error message, including the offending path
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// The operator aborted the run
    #[error("Aborted by user: {message}")]
    UserAbort {
        /// Where the abort happened
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection and authentication errors
    Connection,
    /// Remote listing and hash-query errors
    Listing,
    /// Single-file download errors, including failed resumes
    Download,
    /// Local filesystem errors
    LocalFileAccess,
    /// Configuration errors
    Config,
    /// Operator abort
    UserAbort,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Listing { .. } => ErrorKind::Listing,
            Self::Download { .. } | Self::ResumeFailed { .. } => ErrorKind::Download,
            Self::LocalFileAccess { .. } => ErrorKind::LocalFileAccess,
            Self::Config { .. } => ErrorKind::Config,
            Self::UserAbort { .. } => ErrorKind::UserAbort,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection { .. } => ErrorSeverity::High,
            Self::Listing { .. } => ErrorSeverity::High,
            Self::Download { .. } | Self::ResumeFailed { .. } => ErrorSeverity::Medium,
            Self::LocalFileAccess { .. } => ErrorSeverity::High,
            Self::Config { .. } => ErrorSeverity::Critical,
            Self::UserAbort { .. } => ErrorSeverity::Low,
            Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if this error is recoverable
    ///
    /// A plain download failure leaves a partial file that a later pass can
    /// resume; a failed resume means the file is abandoned for this run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Download { .. } => true,
            Self::ResumeFailed { .. } => false,
            Self::Connection { .. } | Self::Listing { .. } => false,
            Self::LocalFileAccess { .. } | Self::Config { .. } | Self::UserAbort { .. } => false,
            Self::Other { .. } => false,
        }
    }

    /// Check if a stage may record this error as a report item and carry on
    pub fn is_per_file(&self) -> bool {
        self.severity() <= ErrorSeverity::Medium && self.kind() == ErrorKind::Download
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a new listing error
    pub fn listing<S: Into<String>>(message: S) -> Self {
        Self::Listing {
            message: message.into(),
        }
    }

    /// Create a new download error
    pub fn download<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::Download {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new resume-failed error
    pub fn resume_failed<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::ResumeFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new local file access error for `path`
    pub fn local<P: AsRef<Path>, E: std::fmt::Display>(action: &str, path: P, error: E) -> Self {
        Self::LocalFileAccess {
            message: format!(
                "Failed to {} '{}': {}",
                action,
                path.as_ref().display(),
                error
            ),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new user abort error
    pub fn user_abort<S: Into<String>>(message: S) -> Self {
        Self::UserAbort {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::LocalFileAccess {
            message: error.to_string(),
        }
    }
}

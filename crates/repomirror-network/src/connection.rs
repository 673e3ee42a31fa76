//! Control session port and fault classification

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Why a protocol call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// The peer did not answer in time
    Timeout,
    /// Generic socket error
    Io,
    /// 4xx reply: the server asks to try again later
    TemporaryReply,
    /// The connection was reset or closed mid-exchange
    ConnectionReset,
    /// Writing to a closed connection
    BrokenPipe,
    /// There is no open session
    NotConnected,
    /// The server refused the login
    RejectedCredentials,
    /// 5xx reply other than a refused login
    PermanentReply,
    /// A reply that could not be parsed or was not expected
    MalformedReply,
    /// Writing the downloaded data locally failed
    LocalIo,
}

impl FaultKind {
    /// Whether the fault can plausibly go away by itself
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::Io
                | Self::TemporaryReply
                | Self::ConnectionReset
                | Self::BrokenPipe
                | Self::NotConnected
        )
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Io => "I/O error",
            Self::TemporaryReply => "temporary server error",
            Self::ConnectionReset => "connection reset",
            Self::BrokenPipe => "broken pipe",
            Self::NotConnected => "not connected",
            Self::RejectedCredentials => "login rejected",
            Self::PermanentReply => "permanent server error",
            Self::MalformedReply => "unexpected reply",
            Self::LocalIo => "local write error",
        };
        f.write_str(label)
    }
}

/// Error raised by a control session
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SessionError {
    /// Classification
    pub kind: FaultKind,
    /// Details from the server or the socket
    pub message: String,
}

impl SessionError {
    /// Create a new session error
    pub fn new<S: Into<String>>(kind: FaultKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether the retry envelope should try again
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// There is no open session
    pub fn not_connected() -> Self {
        Self::new(FaultKind::NotConnected, "no open session")
    }

    /// Classify a socket error
    pub fn from_io(error: &io::Error) -> Self {
        let kind = match error.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => FaultKind::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof => FaultKind::ConnectionReset,
            io::ErrorKind::BrokenPipe => FaultKind::BrokenPipe,
            io::ErrorKind::NotConnected => FaultKind::NotConnected,
            _ => FaultKind::Io,
        };
        Self::new(kind, error.to_string())
    }

    /// A local file could not be opened or written
    pub fn local(error: &io::Error) -> Self {
        Self::new(FaultKind::LocalIo, error.to_string())
    }

    /// Classify a reply code the client did not expect
    pub fn from_reply(code: u32, text: &str) -> Self {
        let kind = match code {
            530 => FaultKind::RejectedCredentials,
            400..=499 => FaultKind::TemporaryReply,
            500..=599 => FaultKind::PermanentReply,
            _ => FaultKind::MalformedReply,
        };
        Self::new(kind, format!("{} {}", code, text.trim()))
    }
}

/// Result type for session calls
pub type SessionResult<T> = Result<T, SessionError>;

/// One authenticated FTP control session
///
/// Implementations report every failure as a classified [`SessionError`] and
/// never retry on their own.
pub trait ControlSession {
    /// Authenticate
    fn login(&mut self, username: &str, password: &str) -> SessionResult<()>;

    /// Change the working directory
    fn cwd(&mut self, path: &str) -> SessionResult<()>;

    /// Switch to binary transfers
    fn binary_mode(&mut self) -> SessionResult<()>;

    /// Raw `MLSD` lines for the working directory
    fn list_facts(&mut self) -> SessionResult<Vec<String>>;

    /// Stream `name` from byte `offset` into `sink`
    ///
    /// `on_chunk` is called with the size of every block written. Returns the
    /// number of bytes written.
    fn retrieve(
        &mut self,
        name: &str,
        offset: u64,
        sink: &mut dyn Write,
        block_size: usize,
        on_chunk: &mut dyn FnMut(u64),
    ) -> SessionResult<u64>;

    /// Send a raw command and return the reply text
    fn command(&mut self, line: &str) -> SessionResult<String>;

    /// Say goodbye to the server
    fn quit(&mut self) -> SessionResult<()>;
}

/// Opens new control sessions
pub trait Connector {
    /// Session type produced by this connector
    type Session: ControlSession;

    /// Open an unauthenticated session
    fn open(&self, host: &str, port: u16, timeout: Duration) -> SessionResult<Self::Session>;
}

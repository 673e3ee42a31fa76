//! FTP implementation of the remote repository port

use crate::connection::{Connector, ControlSession, FaultKind, SessionError};
use crate::listing::{parse_hash_reply, parse_mlsd_line};
use crate::resume;
use repomirror_config::SyncConfig;
use repomirror_types::{
    BlockSize, DownloadProgress, Error, FileSnapshot, RemoteRepository, RepositorySnapshot, Result,
    RetryPolicy, SnapshotMode,
};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection settings for [`FtpRepository`]
#[derive(Debug, Clone)]
pub struct FtpSettings {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Login password
    pub password: String,
    /// Remote directory that holds the repository
    pub root: String,
    /// Connect and read timeout
    pub timeout: Duration,
    /// Retry policy for every protocol call
    pub retry: RetryPolicy,
    /// Transfer block size
    pub block_size: BlockSize,
    /// Vendor command that returns an MD5 digest, e.g. `XMD5`
    pub hash_command: String,
}

impl FtpSettings {
    /// Derive the settings from a loaded configuration
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            host: config.ftp_host.clone(),
            port: config.ftp_port,
            username: config.ftp_username.clone(),
            password: config.ftp_password.clone(),
            root: config.ftp_root.clone(),
            timeout: config.timeout(),
            retry: config.retry_policy(),
            block_size: config.block_size(),
            hash_command: config.ftp_hash_command.trim().to_string(),
        }
    }

    /// Absolute remote path of a file in the repository root
    pub fn remote_path(&self, name: &str) -> String {
        format!("{}/{}", self.root.trim_end_matches('/'), name)
    }
}

/// Why a call gave up
#[derive(Debug)]
enum CallFailure {
    /// A fault that retrying cannot fix
    Permanent(SessionError),
    /// Every attempt hit a transient fault
    Exhausted { attempts: u32, last: SessionError },
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent(error) => write!(f, "{}", error),
            Self::Exhausted { attempts, last } => {
                write!(f, "{} (gave up after {} attempts)", last, attempts)
            }
        }
    }
}

/// Remote repository reached over FTP
///
/// The repository owns at most one control session. Every protocol call runs
/// inside a retry envelope: a transient fault drops the session, waits for the
/// configured delay and reconnects on the next attempt. Rejected credentials
/// and other permanent faults end the call at once.
pub struct FtpRepository<C: Connector> {
    connector: C,
    settings: FtpSettings,
    session: Option<C::Session>,
}

impl<C: Connector> FtpRepository<C> {
    /// Create a disconnected repository
    pub fn new(connector: C, settings: FtpSettings) -> Self {
        Self {
            connector,
            settings,
            session: None,
        }
    }

    /// Connection settings
    pub fn settings(&self) -> &FtpSettings {
        &self.settings
    }

    /// Whether a session is currently open
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn open_session(&self) -> std::result::Result<C::Session, SessionError> {
        let settings = &self.settings;
        debug!("Connecting to {}:{}", settings.host, settings.port);

        let mut session = self
            .connector
            .open(&settings.host, settings.port, settings.timeout)?;
        session.login(&settings.username, &settings.password)?;
        session.cwd(&settings.root)?;
        session.binary_mode()?;

        info!(
            "Connected to {}:{} as {}, root {}",
            settings.host, settings.port, settings.username, settings.root
        );
        Ok(session)
    }

    fn ensure_session(&mut self) -> std::result::Result<&mut C::Session, SessionError> {
        if self.session.is_none() {
            self.session = Some(self.open_session()?);
        }
        self.session.as_mut().ok_or_else(SessionError::not_connected)
    }

    /// Run `op` with retries and reconnects on transient faults
    fn call<T, F>(&mut self, what: &str, mut op: F) -> std::result::Result<T, CallFailure>
    where
        F: FnMut(&mut C::Session) -> std::result::Result<T, SessionError>,
    {
        let policy = self.settings.retry.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = match self.ensure_session() {
                Ok(session) => op(session),
                Err(error) => Err(error),
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_transient() {
                if error.kind == FaultKind::LocalIo {
                    // the data connection may still be open
                    self.session = None;
                }
                return Err(CallFailure::Permanent(error));
            }

            self.session = None;
            if !policy.has_next(attempt) {
                warn!("{} failed after {} attempts: {}", what, attempt, error);
                return Err(CallFailure::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            warn!(
                "{} failed (attempt {}/{}): {}, reconnecting",
                what, attempt, policy.attempts, error
            );
            if !policy.delay.is_zero() {
                thread::sleep(policy.delay);
            }
        }
    }

    fn remote_hash(&mut self, name: &str) -> Result<String> {
        let line = format!(
            "{} {}",
            self.settings.hash_command,
            self.settings.remote_path(name)
        );
        let reply = self
            .call("hash query", |session| session.command(&line))
            .map_err(|failure| Error::listing(format!("cannot hash '{}': {}", name, failure)))?;

        parse_hash_reply(&reply).ok_or_else(|| {
            Error::listing(format!(
                "unexpected {} reply for '{}': {}",
                self.settings.hash_command,
                name,
                reply.trim()
            ))
        })
    }

    fn fetch(
        &mut self,
        name: &str,
        expected: u64,
        destination: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> std::result::Result<(), CallFailure> {
        let block_size = self.settings.block_size.get();

        self.call("RETR", |session| {
            let offset =
                resume::offset_for(destination, expected).map_err(|e| SessionError::local(&e))?;
            if offset == expected && offset > 0 {
                return Ok(());
            }

            let mut sink = resume::open_for_offset(destination, offset)
                .map_err(|e| SessionError::local(&e))?;

            progress.start(name, Some(expected), offset);
            let result = session.retrieve(name, offset, &mut sink, block_size, &mut |bytes| {
                progress.advance(bytes);
            });
            progress.finish();

            result.map(|written| debug!("Received {} bytes of {}", written, name))
        })
    }
}

impl<C: Connector> RemoteRepository for FtpRepository<C> {
    fn connect(&mut self) -> Result<()> {
        self.session = None;
        let endpoint = format!("{}:{}", self.settings.host, self.settings.port);
        self.call("connect", |_| Ok(()))
            .map_err(|failure| Error::connection(format!("{}: {}", endpoint, failure)))
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(error) = session.quit() {
                debug!("Ignoring error on QUIT: {}", error);
            }
        }
    }

    fn download_dir(
        &mut self,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot> {
        let lines = self
            .call("MLSD", |session| session.list_facts())
            .map_err(|failure| Error::listing(failure.to_string()))?;

        let mut files = Vec::new();
        for line in &lines {
            let Some(entry) = parse_mlsd_line(line) else {
                debug!("Skipping unparsable listing line: {}", line.trim_end());
                continue;
            };
            if !entry.is_file() {
                continue;
            }

            let file = FileSnapshot::new(&entry.name).with_size_opt(entry.size);
            if filter.is_some_and(|names| !names.contains(&file.name)) {
                continue;
            }
            files.push(file);
        }

        if mode == SnapshotMode::Full {
            for file in &mut files {
                file.hash = Some(self.remote_hash(&file.name)?);
            }
        }

        debug!("Remote listing has {} files", files.len());
        Ok(files.into_iter().collect())
    }

    fn download_file(
        &mut self,
        file: &FileSnapshot,
        destination: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> Result<()> {
        let Some(expected) = file.size else {
            return Err(Error::download(
                &file.name,
                "size not reported by server, skipped",
            ));
        };

        let offset = resume::offset_for(destination, expected)
            .map_err(|e| Error::local("inspect", destination, e))?;

        if offset == expected && destination.exists() {
            debug!("{} is already complete", file.name);
        } else {
            match self.fetch(&file.name, expected, destination, progress) {
                Ok(()) => {}
                Err(CallFailure::Exhausted { .. })
                    if resume::local_len(destination).unwrap_or(0) > 0 =>
                {
                    info!("Resuming partial download of {}", file.name);
                    self.fetch(&file.name, expected, destination, progress)
                        .map_err(|failure| Error::resume_failed(&file.name, failure.to_string()))?;
                }
                Err(failure) => return Err(Error::download(&file.name, failure.to_string())),
            }
        }

        match resume::verify_size(destination, expected) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(actual)) => Err(Error::download(
                &file.name,
                format!("size mismatch: expected {} bytes, got {}", expected, actual),
            )),
            Err(e) => Err(Error::local("inspect", destination, e)),
        }
    }
}

//! Configuration management system for repomirror
//!
//! This crate loads the mirror configuration from YAML (or TOML) files,
//! resolves `include:` chains, applies environment overrides and validates the
//! result before any network or filesystem work starts.
//!
//! # Features
//!
//! - **Includes**: A file may name base files that are shallow-merged underneath it
//! - **Multiple formats**: YAML and TOML, chosen by file extension
//! - **Validation**: Unknown keys are rejected, values are range-checked
//! - **Environment overrides**: `REPOMIRROR_FTP_HOST`, `REPOMIRROR_LOGGING__FILE__LEVEL`, ...
//! - **Defaults**: Everything but the remote host and the local directory has a default
//!
//! # Examples
//!
//! ```rust,no_run
//! use repomirror_config::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_file("mirror.yaml")
//!     .expect("Failed to load configuration");
//!
//! println!("Mirroring {} into {}", config.ftp_host, config.local_dir.display());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use repomirror_types::{BlockSize, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod builder;
pub mod error;
pub mod include;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Application name used for platform directories
pub const APP_NAME: &str = "repomirror";

/// Main configuration structure for a mirror run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote host name or address
    pub ftp_host: String,
    /// Remote control port
    #[serde(default = "default_ftp_port")]
    pub ftp_port: u16,
    /// Login name
    #[serde(default = "default_ftp_username")]
    pub ftp_username: String,
    /// Login password
    #[serde(default = "default_ftp_password")]
    pub ftp_password: String,
    /// Remote directory that is mirrored
    #[serde(default = "default_ftp_root")]
    pub ftp_root: String,
    /// Connect and read timeout in seconds
    #[serde(default = "default_ftp_timeout_sec")]
    pub ftp_timeout_sec: f64,
    /// Attempts per protocol call
    #[serde(default = "default_ftp_repeat")]
    pub ftp_repeat: u32,
    /// Pause between attempts in seconds
    #[serde(default = "default_ftp_retry_delay_seconds")]
    pub ftp_retry_delay_seconds: f64,
    /// Transfer block size in bytes
    #[serde(default = "default_ftp_blocksize")]
    pub ftp_blocksize: usize,
    /// Vendor command that returns a file's MD5 digest
    #[serde(default = "default_ftp_hash_command")]
    pub ftp_hash_command: String,

    /// Live local repository
    pub local_dir: PathBuf,
    /// Staging directory for downloads, defaults to `<local_dir>/NEW`
    #[serde(default)]
    pub new_dir: Option<PathBuf>,
    /// Directory for retired files, defaults to `<local_dir>/OLD`
    #[serde(default)]
    pub old_dir: Option<PathBuf>,

    /// Component names (with extension) that must not be downloaded
    #[serde(default)]
    pub stop_list: Vec<String>,
    /// File names that are always refreshed
    #[serde(default)]
    pub add_list: Vec<String>,

    /// How staged files are checked before they are promoted
    #[serde(default)]
    pub verify_mode: VerifyMode,

    /// Once-per-day stamp file, defaults to `date_file` in the log directory
    #[serde(default)]
    pub date_file: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Create a configuration with defaults for everything but host and directory
    pub fn new<H: Into<String>, P: Into<PathBuf>>(ftp_host: H, local_dir: P) -> Self {
        Self {
            ftp_host: ftp_host.into(),
            ftp_port: default_ftp_port(),
            ftp_username: default_ftp_username(),
            ftp_password: default_ftp_password(),
            ftp_root: default_ftp_root(),
            ftp_timeout_sec: default_ftp_timeout_sec(),
            ftp_repeat: default_ftp_repeat(),
            ftp_retry_delay_seconds: default_ftp_retry_delay_seconds(),
            ftp_blocksize: default_ftp_blocksize(),
            ftp_hash_command: default_ftp_hash_command(),
            local_dir: local_dir.into(),
            new_dir: None,
            old_dir: None,
            stop_list: Vec::new(),
            add_list: Vec::new(),
            verify_mode: VerifyMode::default(),
            date_file: None,
            logging: LoggingConfig::default(),
        }
    }

    /// Staging ("incoming") directory
    pub fn incoming_dir(&self) -> PathBuf {
        self.new_dir
            .clone()
            .unwrap_or_else(|| self.local_dir.join("NEW"))
    }

    /// Retired directory
    pub fn retired_dir(&self) -> PathBuf {
        self.old_dir
            .clone()
            .unwrap_or_else(|| self.local_dir.join("OLD"))
    }

    /// Stamp file used by the once-per-day gate
    pub fn stamp_file(&self) -> PathBuf {
        self.date_file
            .clone()
            .unwrap_or_else(|| default_log_dir(&self.local_dir).join("date_file"))
    }

    /// Log file written by the file logging layer
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .path
            .clone()
            .unwrap_or_else(|| default_log_dir(&self.local_dir).join("sync.log"))
    }

    /// Connect and read timeout
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.ftp_timeout_sec).unwrap_or(Duration::from_secs(3))
    }

    /// Retry policy for protocol calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.ftp_repeat.max(1),
            delay: Duration::try_from_secs_f64(self.ftp_retry_delay_seconds)
                .unwrap_or(Duration::ZERO),
        }
    }

    /// Transfer block size
    pub fn block_size(&self) -> BlockSize {
        BlockSize::new(self.ftp_blocksize).unwrap_or_default()
    }
}

/// How staged files are verified against the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyMode {
    /// Compare sizes only
    Size,
    /// Compare sizes and MD5 digests
    #[default]
    Md5Hash,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Console output
    #[serde(default)]
    pub console: ConsoleLoggingConfig,
    /// Log file output
    #[serde(default)]
    pub file: FileLoggingConfig,
}

/// Console logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleLoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_console_level")]
    pub level: String,
}

impl Default for ConsoleLoggingConfig {
    fn default() -> Self {
        Self {
            level: default_console_level(),
        }
    }
}

/// File logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    /// Enable the log file
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_file_level")]
    pub level: String,
    /// Log file path, defaults to `sync.log` in the platform log directory
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// When to start a new log file
    #[serde(default)]
    pub rotation: LogRotation,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_file_level(),
            path: None,
            rotation: LogRotation::default(),
        }
    }
}

/// Log file rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// One file, appended forever
    #[default]
    Never,
    /// A new file every day
    Daily,
    /// A new file every hour
    Hourly,
}

/// Platform log directory, falling back to `<fallback>/logs`
pub fn default_log_dir(fallback: &Path) -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_local_dir().join("logs"))
        .unwrap_or_else(|| fallback.join("logs"))
}

fn default_ftp_port() -> u16 {
    21
}

fn default_ftp_username() -> String {
    "anonymous".to_string()
}

fn default_ftp_password() -> String {
    "anonymous@".to_string()
}

fn default_ftp_root() -> String {
    "/".to_string()
}

fn default_ftp_timeout_sec() -> f64 {
    3.0
}

fn default_ftp_repeat() -> u32 {
    3
}

fn default_ftp_retry_delay_seconds() -> f64 {
    1.0
}

fn default_ftp_blocksize() -> usize {
    BlockSize::DEFAULT
}

fn default_ftp_hash_command() -> String {
    "XMD5".to_string()
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

fn default_true() -> bool {
    true
}

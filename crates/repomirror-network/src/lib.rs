//! Retrying, resumable FTP transport for repomirror
//!
//! This crate implements the [`RemoteRepository`](repomirror_types::RemoteRepository)
//! port on top of a plain FTP control session:
//!
//! - **Retry envelope**: Every protocol call is retried on transient faults, with one
//!   reconnect and a fixed pause between attempts
//! - **Fault classification**: Rejected credentials and malformed replies are never retried
//! - **Resume support**: Partial local files are continued with `REST` from their current length
//! - **Listing**: `MLSD` facts become a repository snapshot, optionally with vendor `XMD5` digests
//! - **Pluggable sessions**: The protocol session sits behind [`ControlSession`], so the adapter
//!   can be driven by an in-memory session in tests
//!
//! # Examples
//!
//! ```rust,no_run
//! use repomirror_config::SyncConfig;
//! use repomirror_network::{FtpRepository, FtpSettings, SuppaConnector};
//! use repomirror_types::{RemoteRepository, SnapshotMode};
//!
//! # fn example() -> repomirror_types::Result<()> {
//! let config = SyncConfig::new("ftp.example.org", "/srv/mirror");
//! let mut remote = FtpRepository::new(SuppaConnector, FtpSettings::from_config(&config));
//!
//! remote.connect()?;
//! let snapshot = remote.download_dir(None, SnapshotMode::Lite)?;
//! println!("{} files on the server", snapshot.len());
//! remote.close();
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod connection;
pub mod ftp;
pub mod listing;
pub mod resume;

pub use client::{FtpRepository, FtpSettings};
pub use connection::{Connector, ControlSession, FaultKind, SessionError, SessionResult};
pub use ftp::{SuppaConnector, SuppaSession};
pub use listing::{parse_hash_reply, parse_mlsd_line, ListingEntry};

//! Core traits for repomirror
//!
//! This module defines the ports the sync stages talk through: the remote
//! repository transport, the operator who resolves leftover state, and the
//! observer that renders download progress.

use crate::{FileSnapshot, IncomingDecision, RepositorySnapshot, Result, RetiredDecision, SnapshotMode};
use std::collections::BTreeSet;
use std::path::Path;

/// Access to the remote repository
///
/// One implementation owns one protocol session for the whole run. Transient
/// faults are handled inside the implementation; everything returned as an
/// error is permanent from the caller's point of view.
pub trait RemoteRepository {
    /// Open the session and authenticate
    fn connect(&mut self) -> Result<()>;

    /// Tear the session down, swallowing any error
    fn close(&mut self);

    /// List the remote directory
    ///
    /// Only regular files are returned. When `filter` is given, only names in
    /// it are kept. Hashes are computed only in [`SnapshotMode::Full`].
    fn download_dir(
        &mut self,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot>;

    /// Fetch one file into `destination`, resuming a partial local file
    fn download_file(
        &mut self,
        file: &FileSnapshot,
        destination: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> Result<()>;
}

/// Decisions that need a human
pub trait OperatorPrompt {
    /// The incoming directory holds `entries` leftovers from an earlier run
    fn resolve_incoming(&self, incoming: &Path, entries: usize) -> Result<IncomingDecision>;

    /// The retired directory holds `entries` files from an earlier run
    fn resolve_retired(&self, retired: &Path, entries: usize) -> Result<RetiredDecision>;
}

/// Observer for download progress
pub trait DownloadProgress {
    /// A download starts at `offset` of `total` bytes
    fn start(&mut self, name: &str, total: Option<u64>, offset: u64);

    /// `bytes` more bytes were written
    fn advance(&mut self, bytes: u64);

    /// The current download ended, successfully or not
    fn finish(&mut self);
}

/// Progress observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn start(&mut self, _name: &str, _total: Option<u64>, _offset: u64) {}

    fn advance(&mut self, _bytes: u64) {}

    fn finish(&mut self) {}
}

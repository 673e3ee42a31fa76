//! Snapshot building

use crate::hash::md5_file;
use crate::ports::SnapshotService;
use repomirror_types::{
    Error, FileSnapshot, RemoteRepository, RepositorySnapshot, Result, SnapshotMode,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Snapshots local directories directly and delegates remote listings
///
/// Only regular files at the top level are recorded. Subdirectories, such as
/// the default staging and retired directories inside the live one, are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSnapshotService;

impl SnapshotService for FsSnapshotService {
    fn local(
        &self,
        dir: &Path,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot> {
        let unreadable = |e: std::io::Error| {
            Error::config(format!("Cannot read directory '{}': {}", dir.display(), e))
        };

        let mut snapshot = RepositorySnapshot::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            let path = entry.path();

            let metadata = fs::metadata(&path).map_err(|e| Error::local("inspect", &path, e))?;
            if !metadata.is_file() {
                trace!("Skipping non-file entry {}", path.display());
                continue;
            }

            let file = FileSnapshot::new(entry.file_name().to_string_lossy());
            if filter.is_some_and(|names| !names.contains(&file.name)) {
                continue;
            }

            let mut file = file.with_size(metadata.len());
            if mode == SnapshotMode::Full {
                file = file.with_hash(md5_file(&path).map_err(|e| Error::local("hash", &path, e))?);
            }
            snapshot.insert(file);
        }

        debug!("{} holds {} files", dir.display(), snapshot.len());
        Ok(snapshot)
    }

    fn remote(
        &self,
        repo: &mut dyn RemoteRepository,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot> {
        repo.download_dir(filter, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomirror_types::ErrorKind;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_1.zip"), b"abc").unwrap();
        fs::write(dir.path().join("b_2.zip"), b"hello").unwrap();
        fs::create_dir(dir.path().join("NEW")).unwrap();
        dir
    }

    #[test]
    fn test_lite_snapshot_has_sizes_only() {
        let dir = fixture();
        let snapshot = FsSnapshotService
            .local(dir.path(), None, SnapshotMode::Lite)
            .unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains("NEW"));
        let a = snapshot.get("a_1.zip").unwrap();
        assert_eq!(a.size, Some(3));
        assert!(a.hash.is_none());
    }

    #[test]
    fn test_full_snapshot_hashes_filtered_files() {
        let dir = fixture();
        let filter: BTreeSet<String> = ["a_1.zip".to_string()].into_iter().collect();
        let snapshot = FsSnapshotService
            .local(dir.path(), Some(&filter), SnapshotMode::Full)
            .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("a_1.zip").unwrap().hash.as_deref(),
            Some("900150983cd24fb0d6963f7d28e17f72")
        );
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let dir = TempDir::new().unwrap();
        let error = FsSnapshotService
            .local(&dir.path().join("missing"), None, SnapshotMode::Lite)
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }
}

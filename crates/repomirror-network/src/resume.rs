//! Partial-file handling for resumable downloads
//!
//! A download always continues from the current length of the local file.
//! Files that are already longer than the remote one cannot be continued and
//! are discarded.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Current length of a local file, or 0 when it does not exist
pub fn local_len(path: &Path) -> io::Result<u64> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

/// Byte offset to resume a download of `expected` bytes from
///
/// A local file longer than `expected` is removed and the download restarts
/// from the beginning.
pub fn offset_for(path: &Path, expected: u64) -> io::Result<u64> {
    let current = local_len(path)?;
    if current > expected {
        warn!(
            "Local file {} is longer than the remote one ({} > {}), restarting",
            path.display(),
            current,
            expected
        );
        fs::remove_file(path)?;
        return Ok(0);
    }
    if current > 0 {
        debug!("Resuming {} at byte {}", path.display(), current);
    }
    Ok(current)
}

/// Open the destination for writing at `offset`
///
/// Offset 0 truncates, any other offset appends.
pub fn open_for_offset(path: &Path, offset: u64) -> io::Result<File> {
    if offset > 0 {
        OpenOptions::new().append(true).open(path)
    } else {
        File::create(path)
    }
}

/// Check that the local file has exactly `expected` bytes
pub fn verify_size(path: &Path, expected: u64) -> io::Result<Result<(), u64>> {
    let actual = local_len(path)?;
    if actual == expected {
        Ok(Ok(()))
    } else {
        Ok(Err(actual))
    }
}

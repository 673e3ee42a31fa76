//! Filesystem helpers shared by the staging and commit stages

use repomirror_types::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::local("create directory", dir, e))
}

/// Every entry directly inside `dir`, sorted by path
pub fn entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read = |e: io::Error| Error::local("read directory", dir, e);

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read)? {
        paths.push(entry.map_err(read)?.path());
    }
    paths.sort();
    Ok(paths)
}

/// Whether `path` is a regular file, without following symlinks
pub fn is_regular_file(path: &Path) -> Result<bool> {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.is_file())
        .map_err(|e| Error::local("inspect", path, e))
}

/// Delete every regular file directly inside `dir`
///
/// Anything else found there is an error; the directory is left as it was
/// from that entry on.
pub fn clean_dir(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in entries(dir)? {
        if !is_regular_file(&path)? {
            return Err(Error::local("clean", &path, "not a regular file"));
        }
        fs::remove_file(&path).map_err(|e| Error::local("delete", &path, e))?;
        removed += 1;
    }
    debug!("Removed {} files from {}", removed, dir.display());
    Ok(removed)
}

/// Whether two existing directories live on the same volume
#[cfg(unix)]
pub fn same_volume(a: &Path, b: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let device = |path: &Path| {
        fs::metadata(path)
            .map(|metadata| metadata.dev())
            .map_err(|e| Error::local("inspect", path, e))
    };
    Ok(device(a)? == device(b)?)
}

/// Whether two existing directories live on the same volume
#[cfg(windows)]
pub fn same_volume(a: &Path, b: &Path) -> Result<bool> {
    use std::path::Component;

    let prefix = |path: &Path| {
        let canonical = fs::canonicalize(path).map_err(|e| Error::local("resolve", path, e))?;
        Ok::<_, Error>(match canonical.components().next() {
            Some(Component::Prefix(prefix)) => Some(prefix.as_os_str().to_ascii_uppercase()),
            _ => None,
        })
    };
    Ok(prefix(a)? == prefix(b)?)
}

/// Whether two existing directories live on the same volume
#[cfg(not(any(unix, windows)))]
pub fn same_volume(_a: &Path, _b: &Path) -> Result<bool> {
    Ok(true)
}

/// Move `file` into `dir`, refusing to replace an existing file there
pub fn move_into(file: &Path, dir: &Path) -> Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| Error::local("move", file, "path has no file name"))?;
    let target = dir.join(name);

    if target.exists() {
        return Err(Error::local(
            "move",
            file,
            format!("'{}' already exists", target.display()),
        ));
    }

    fs::rename(file, &target).map_err(|e| Error::local("move", file, e))?;
    Ok(target)
}

/// Copy `source` into `dir` under the same name, atomically
///
/// The data goes to a hidden temporary name first, is synced, and is then
/// renamed over the target. The temporary file is removed on failure.
pub fn copy_atomic(source: &Path, dir: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| Error::local("copy", source, "path has no file name"))?;
    let target = dir.join(name);
    let temporary = dir.join(format!(
        ".tmp-{}-{}",
        Uuid::new_v4(),
        name.to_string_lossy()
    ));

    if let Err(e) = copy_then_rename(source, &temporary, &target) {
        if temporary.exists() {
            let _ = fs::remove_file(&temporary);
        }
        return Err(Error::local("copy", source, e));
    }
    Ok(target)
}

fn copy_then_rename(source: &Path, temporary: &Path, target: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let mut writer = File::create(temporary)?;
    io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    drop(writer);
    fs::rename(temporary, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entries_are_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b"), b"").unwrap();
        fs::write(dir.path().join("a"), b"").unwrap();

        let names: Vec<_> = entries(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_clean_dir_removes_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), b"1").unwrap();
        fs::write(dir.path().join("b"), b"2").unwrap();

        assert_eq!(clean_dir(dir.path()).unwrap(), 2);
        assert!(entries(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_clean_dir_rejects_subdirectories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let error = clean_dir(dir.path()).unwrap_err();
        assert!(error.to_string().contains("not a regular file"));
        assert!(dir.path().join("nested").exists());
    }

    #[test]
    fn test_same_volume_for_sibling_dirs() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();

        assert!(same_volume(&a, &b).unwrap());
    }

    #[test]
    fn test_move_into_refuses_collision() {
        let dir = TempDir::new().unwrap();
        let retired = dir.path().join("OLD");
        fs::create_dir(&retired).unwrap();
        let file = dir.path().join("a.zip");
        fs::write(&file, b"new").unwrap();
        fs::write(retired.join("a.zip"), b"old").unwrap();

        assert!(move_into(&file, &retired).is_err());
        assert!(file.exists());
        assert_eq!(fs::read(retired.join("a.zip")).unwrap(), b"old");
    }

    #[test]
    fn test_move_into() {
        let dir = TempDir::new().unwrap();
        let retired = dir.path().join("OLD");
        fs::create_dir(&retired).unwrap();
        let file = dir.path().join("a.zip");
        fs::write(&file, b"data").unwrap();

        let target = move_into(&file, &retired).unwrap();
        assert!(!file.exists());
        assert_eq!(fs::read(target).unwrap(), b"data");
    }

    #[test]
    fn test_copy_atomic_replaces_target_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let live = dir.path().join("live");
        fs::create_dir(&live).unwrap();
        let source = dir.path().join("a.zip");
        fs::write(&source, b"fresh").unwrap();
        fs::write(live.join("a.zip"), b"stale").unwrap();

        copy_atomic(&source, &live).unwrap();

        assert_eq!(fs::read(live.join("a.zip")).unwrap(), b"fresh");
        assert!(source.exists());
        assert_eq!(entries(&live).unwrap().len(), 1);
    }

    #[test]
    fn test_copy_atomic_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = copy_atomic(&dir.path().join("nope.zip"), dir.path());
        assert!(result.is_err());
        assert!(entries(dir.path()).unwrap().is_empty());
    }
}

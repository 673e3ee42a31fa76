//! Unified test utilities for repomirror integration tests
//!
//! This module provides common utilities used across all test files
//! to ensure consistency and reduce code duplication.

use repomirror_config::SyncConfig;
use repomirror_sync::{hash, RunContext};
use repomirror_types::{
    DownloadProgress, Error, FileSnapshot, IncomingDecision, OperatorPrompt, RemoteRepository,
    RepositorySnapshot, Result, RetiredDecision, SnapshotMode, StopListMode,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// How a download of one file misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFault {
    /// The download fails without writing anything
    Fail,
    /// The file arrives with the right size but wrong content
    Corrupt,
}

/// Remote repository backed by a local directory
///
/// Listings and downloads read the directory directly. Downloads honour a
/// partial destination file and record the offset they resumed from.
#[derive(Debug)]
pub struct DirRepository {
    root: PathBuf,
    connected: bool,
    connects: usize,
    closes: usize,
    listing_fails: bool,
    faults: BTreeMap<String, DownloadFault>,
    resumed: Vec<(String, u64)>,
}

impl DirRepository {
    /// Serve the files of `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            connected: false,
            connects: 0,
            closes: 0,
            listing_fails: false,
            faults: BTreeMap::new(),
            resumed: Vec::new(),
        }
    }

    /// Make every listing fail
    pub fn with_failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    /// Make the download of `name` misbehave
    pub fn with_fault<S: Into<String>>(mut self, name: S, fault: DownloadFault) -> Self {
        self.faults.insert(name.into(), fault);
        self
    }

    /// Stop injecting faults
    pub fn clear_faults(&mut self) {
        self.faults.clear();
        self.listing_fails = false;
    }

    /// Files fetched so far with the offset each one started at
    pub fn downloads(&self) -> &[(String, u64)] {
        &self.resumed
    }

    /// Names fetched so far
    pub fn downloaded_names(&self) -> Vec<&str> {
        self.resumed.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Forget the recorded downloads
    pub fn reset_downloads(&mut self) {
        self.resumed.clear();
    }

    /// Whether a session is open
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of connects and closes so far
    pub fn sessions(&self) -> (usize, usize) {
        (self.connects, self.closes)
    }

    fn require_session(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::connection("not connected"))
        }
    }
}

impl RemoteRepository for DirRepository {
    fn connect(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::connection(format!(
                "no repository at {}",
                self.root.display()
            )));
        }
        self.connected = true;
        self.connects += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.connected = false;
        self.closes += 1;
    }

    fn download_dir(
        &mut self,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot> {
        self.require_session()?;
        if self.listing_fails {
            return Err(Error::listing("550 listing refused"));
        }

        let mut snapshot = RepositorySnapshot::new();
        let entries =
            fs::read_dir(&self.root).map_err(|e| Error::listing(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::listing(e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if filter.is_some_and(|names| !names.contains(&name)) {
                continue;
            }
            let size = fs::metadata(&path)
                .map_err(|e| Error::listing(e.to_string()))?
                .len();
            let mut file = FileSnapshot::new(&name).with_size(size);
            if mode == SnapshotMode::Full {
                let digest = hash::md5_file(&path).map_err(|e| Error::listing(e.to_string()))?;
                file = file.with_hash(digest);
            }
            snapshot.insert(file);
        }
        Ok(snapshot)
    }

    fn download_file(
        &mut self,
        file: &FileSnapshot,
        destination: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> Result<()> {
        self.require_session()?;
        let fault = self.faults.get(&file.name).copied();
        if fault == Some(DownloadFault::Fail) {
            return Err(Error::download(&file.name, "connection reset"));
        }

        let mut data = fs::read(self.root.join(&file.name))
            .map_err(|e| Error::download(&file.name, e.to_string()))?;
        if fault == Some(DownloadFault::Corrupt) {
            for byte in &mut data {
                *byte = !*byte;
            }
        }

        let existing = fs::metadata(destination).map(|m| m.len()).unwrap_or(0);
        let offset = if existing > data.len() as u64 { 0 } else { existing };
        let mut out = OpenOptions::new()
            .create(true)
            .write(true)
            .append(offset > 0)
            .truncate(offset == 0)
            .open(destination)
            .map_err(|e| Error::local("open", destination, e))?;

        progress.start(&file.name, Some(data.len() as u64), offset);
        let rest = &data[offset as usize..];
        out.write_all(rest)
            .map_err(|e| Error::local("write", destination, e))?;
        progress.advance(rest.len() as u64);
        progress.finish();

        self.resumed.push((file.name.clone(), offset));
        Ok(())
    }
}

/// One scripted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Answer to the incoming-directory question
    Incoming(IncomingDecision),
    /// Answer to the retired-directory question
    Retired(RetiredDecision),
}

/// Operator that answers from a script
///
/// A question with no matching answer at the front of the script aborts the
/// run, the way an interrupted terminal prompt would.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    /// Operator that answers `answers` in order
    pub fn new<I: IntoIterator<Item = Answer>>(answers: I) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Operator that must never be asked anything
    pub fn silent() -> Self {
        Self::default()
    }

    /// Questions asked so far, `"incoming"` or `"retired"`
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Answers not used yet
    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, question: &str) -> Option<Answer> {
        self.asked.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front()
    }
}

impl OperatorPrompt for ScriptedPrompt {
    fn resolve_incoming(&self, _incoming: &Path, _entries: usize) -> Result<IncomingDecision> {
        match self.next("incoming") {
            Some(Answer::Incoming(decision)) => Ok(decision),
            _ => Err(Error::user_abort("no scripted answer for the incoming prompt")),
        }
    }

    fn resolve_retired(&self, _retired: &Path, _entries: usize) -> Result<RetiredDecision> {
        match self.next("retired") {
            Some(Answer::Retired(decision)) => Ok(decision),
            _ => Err(Error::user_abort("no scripted answer for the retired prompt")),
        }
    }
}

/// A remote directory, a live directory and a state directory in one temp dir
pub struct MirrorFixture {
    dir: TempDir,
    stop_list: Vec<String>,
    add_list: Vec<String>,
    size_only: bool,
}

impl MirrorFixture {
    /// Create the fixture with empty remote and live directories
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("cannot create temp dir: {}", e));
        for sub in ["remote", "live"] {
            fs::create_dir_all(dir.path().join(sub))
                .unwrap_or_else(|e| panic!("cannot create {}: {}", sub, e));
        }
        Self {
            dir,
            stop_list: Vec::new(),
            add_list: Vec::new(),
            size_only: false,
        }
    }

    /// Stop-list entries for the configuration
    pub fn with_stop_list(mut self, entries: &[&str]) -> Self {
        self.stop_list = entries.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add-list entries for the configuration
    pub fn with_add_list(mut self, entries: &[&str]) -> Self {
        self.add_list = entries.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Verify by size only
    pub fn size_only(mut self) -> Self {
        self.size_only = true;
        self
    }

    /// Directory served by [`Self::repository`]
    pub fn remote_dir(&self) -> PathBuf {
        self.dir.path().join("remote")
    }

    /// Live local directory
    pub fn live_dir(&self) -> PathBuf {
        self.dir.path().join("live")
    }

    /// Configuration pointing at the fixture directories
    pub fn config(&self) -> SyncConfig {
        let mut config = SyncConfig::new("ftp.example.org", self.live_dir());
        config.date_file = Some(self.dir.path().join("state").join("date_file"));
        config.logging.file.enabled = false;
        config.stop_list = self.stop_list.clone();
        config.add_list = self.add_list.clone();
        if self.size_only {
            config.verify_mode = repomirror_config::VerifyMode::Size;
        }
        config
    }

    /// Run context for the fixture configuration
    pub fn context(&self, once_per_day: bool, mode: StopListMode) -> RunContext {
        RunContext::new(self.config())
            .with_once_per_day(once_per_day)
            .with_stop_list_mode(mode)
    }

    /// Repository serving the remote directory
    pub fn repository(&self) -> DirRepository {
        DirRepository::new(self.remote_dir())
    }

    /// Put a file on the remote side
    pub fn remote_file(&self, name: &str, data: &[u8]) {
        write_file(&self.remote_dir(), name, data);
    }

    /// Remove a file from the remote side
    pub fn remove_remote(&self, name: &str) {
        let path = self.remote_dir().join(name);
        fs::remove_file(&path).unwrap_or_else(|e| panic!("cannot remove {}: {}", path.display(), e));
    }

    /// Put a file into the live directory
    pub fn live_file(&self, name: &str, data: &[u8]) {
        write_file(&self.live_dir(), name, data);
    }

    /// Put a file into the incoming directory
    pub fn incoming_file(&self, name: &str, data: &[u8]) {
        write_file(&self.config().incoming_dir(), name, data);
    }

    /// Put a file into the retired directory
    pub fn retired_file(&self, name: &str, data: &[u8]) {
        write_file(&self.config().retired_dir(), name, data);
    }

    /// Regular files in the live directory, sorted
    pub fn live_names(&self) -> Vec<String> {
        file_names(&self.live_dir())
    }

    /// Regular files in the remote directory, sorted
    pub fn remote_names(&self) -> Vec<String> {
        file_names(&self.remote_dir())
    }

    /// Regular files in the incoming directory, sorted
    pub fn incoming_names(&self) -> Vec<String> {
        file_names(&self.config().incoming_dir())
    }

    /// Regular files in the retired directory, sorted
    pub fn retired_names(&self) -> Vec<String> {
        file_names(&self.config().retired_dir())
    }

    /// Content of a live file
    pub fn read_live(&self, name: &str) -> Vec<u8> {
        let path = self.live_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
    }
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic content of `size` bytes, distinct per `seed`
pub fn content(seed: u8, size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

fn write_file(dir: &Path, name: &str, data: &[u8]) {
    fs::create_dir_all(dir).unwrap_or_else(|e| panic!("cannot create {}: {}", dir.display(), e));
    let path = dir.join(name);
    fs::write(&path, data).unwrap_or_else(|e| panic!("cannot write {}: {}", path.display(), e));
}

fn file_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomirror_types::NoProgress;

    #[test]
    fn test_dir_repository_lists_and_resumes() {
        let fx = MirrorFixture::new();
        fx.remote_file("a_1.zip", &content(1, 100));
        fs::create_dir_all(fx.remote_dir().join("sub")).unwrap();

        let mut repo = fx.repository();
        assert!(repo.download_dir(None, SnapshotMode::Lite).is_err());
        repo.connect().unwrap();

        let listing = repo.download_dir(None, SnapshotMode::Full).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.get("a_1.zip").unwrap().size, Some(100));
        assert!(listing.get("a_1.zip").unwrap().hash.is_some());

        let dest = fx.live_dir().join("a_1.zip");
        fs::write(&dest, &content(1, 100)[..40]).unwrap();
        repo.download_file(&FileSnapshot::new("a_1.zip"), &dest, &mut NoProgress)
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), content(1, 100));
        assert_eq!(repo.downloads(), &[("a_1.zip".to_string(), 40)]);
    }

    #[test]
    fn test_scripted_prompt_runs_dry() {
        let prompt = ScriptedPrompt::new([Answer::Retired(RetiredDecision::Delete)]);
        let dir = Path::new("/tmp");

        assert!(prompt.resolve_incoming(dir, 1).is_err());
        assert!(prompt.resolve_retired(dir, 1).is_err());
        assert_eq!(prompt.asked(), vec!["incoming", "retired"]);
    }
}

//! Core data types for repomirror
//!
//! Snapshots, plans and report items. Everything here is plain data: built by
//! one stage, read by the next, and dropped at the end of the run.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Point-in-time description of one file
///
/// Identity is the trimmed name only. Two snapshots with the same name are the
/// same slot even when their size or hash differ, which is what lets the
/// planner work with plain set operations.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileSnapshot {
    /// File name, trimmed
    pub name: String,
    /// Size in bytes, if known
    pub size: Option<u64>,
    /// Lower-case hex content hash, if computed
    pub hash: Option<String>,
}

impl FileSnapshot {
    /// Create a snapshot with no size or hash
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            size: None,
            hash: None,
        }
    }

    /// Set the size
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the size from an optional value
    pub fn with_size_opt(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Set the content hash
    pub fn with_hash<S: Into<String>>(mut self, hash: S) -> Self {
        self.hash = Some(hash.into());
        self
    }
}

impl PartialEq for FileSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FileSnapshot {}

impl Hash for FileSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for FileSnapshot {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileSnapshot {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Name-keyed snapshot of one directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    files: BTreeMap<String, FileSnapshot>,
}

impl RepositorySnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous entry with the same name
    pub fn insert(&mut self, file: FileSnapshot) {
        self.files.insert(file.name.clone(), file);
    }

    /// Look up a file by name
    pub fn get(&self, name: &str) -> Option<&FileSnapshot> {
        self.files.get(name.trim())
    }

    /// Check whether a file is present
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name.trim())
    }

    /// The set of file names
    pub fn names(&self) -> BTreeSet<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over files in name order
    pub fn iter(&self) -> btree_map::Values<'_, String, FileSnapshot> {
        self.files.values()
    }
}

impl FromIterator<FileSnapshot> for RepositorySnapshot {
    fn from_iter<I: IntoIterator<Item = FileSnapshot>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for file in iter {
            snapshot.insert(file);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a RepositorySnapshot {
    type Item = &'a FileSnapshot;
    type IntoIter = btree_map::Values<'a, String, FileSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// What has to happen to reconcile the local repository with the remote one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPlan {
    /// Local files to retire, sorted by name
    pub to_delete: Vec<FileSnapshot>,
    /// Remote files to fetch, sorted by name
    pub to_download: Vec<FileSnapshot>,
}

impl DiffPlan {
    /// Create a plan; both lists are sorted by name
    pub fn new(mut to_delete: Vec<FileSnapshot>, mut to_download: Vec<FileSnapshot>) -> Self {
        to_delete.sort();
        to_download.sort();
        Self {
            to_delete,
            to_download,
        }
    }

    /// Whether there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_download.is_empty()
    }

    /// Names of the files to download
    pub fn download_names(&self) -> BTreeSet<String> {
        self.to_download.iter().map(|f| f.name.clone()).collect()
    }
}

/// Severity of a report item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportStatus {
    /// Informational
    Info,
    /// Informational, worth highlighting
    ImportantInfo,
    /// Something was skipped on purpose
    Warning,
    /// A file or check failed
    Error,
    /// The repository state is unsafe to promote
    Fatal,
}

impl ReportStatus {
    /// Whether this status means the repositories are not in sync
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::ImportantInfo => "IMPORTANT_INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        };
        f.pad(label)
    }
}

/// One finding of a run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportItem {
    /// File, component or stage the finding is about
    pub name: String,
    /// Severity
    pub status: ReportStatus,
    /// Human-readable description
    pub comment: String,
}

impl ReportItem {
    /// Create a new report item
    pub fn new<N: Into<String>, C: Into<String>>(name: N, status: ReportStatus, comment: C) -> Self {
        Self {
            name: name.into(),
            status,
            comment: comment.into(),
        }
    }

    /// Create an INFO item
    pub fn info<N: Into<String>, C: Into<String>>(name: N, comment: C) -> Self {
        Self::new(name, ReportStatus::Info, comment)
    }

    /// Create an IMPORTANT_INFO item
    pub fn important<N: Into<String>, C: Into<String>>(name: N, comment: C) -> Self {
        Self::new(name, ReportStatus::ImportantInfo, comment)
    }

    /// Create a WARNING item
    pub fn warning<N: Into<String>, C: Into<String>>(name: N, comment: C) -> Self {
        Self::new(name, ReportStatus::Warning, comment)
    }

    /// Create an ERROR item
    pub fn error<N: Into<String>, C: Into<String>>(name: N, comment: C) -> Self {
        Self::new(name, ReportStatus::Error, comment)
    }

    /// Create a FATAL item
    pub fn fatal<N: Into<String>, C: Into<String>>(name: N, comment: C) -> Self {
        Self::new(name, ReportStatus::Fatal, comment)
    }
}

/// Ordered list of report items produced by one stage or one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    items: Vec<ReportItem>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&mut self, item: ReportItem) {
        self.items.push(item);
    }

    /// Append every item of another report
    pub fn append(&mut self, other: Report) {
        self.items.extend(other.items);
    }

    /// Whether the report has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether any item is an ERROR or FATAL
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|item| item.status.is_failure())
    }

    /// Number of items with the given status
    pub fn count(&self, status: ReportStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }

    /// Stable sort by item name
    pub fn sort_by_name(&mut self) {
        self.items.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Iterate over items
    pub fn iter(&self) -> std::slice::Iter<'_, ReportItem> {
        self.items.iter()
    }
}

impl From<Vec<ReportItem>> for Report {
    fn from(items: Vec<ReportItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ReportItem;
    type IntoIter = std::slice::Iter<'a, ReportItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// How much detail a snapshot records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotMode {
    /// Names and sizes only
    Lite,
    /// Names, sizes and content hashes
    Full,
}

/// Whether the planner applies the stop-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopListMode {
    /// Exclude stop-listed components from downloads
    UseStopList,
    /// Ignore the stop-list
    #[default]
    NoList,
}

/// Verdict of the once-per-day gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionChoice {
    /// Go ahead with the run
    Run,
    /// A run already happened today
    Skip,
}

/// Operator decision when the incoming directory is not empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomingDecision {
    /// Keep the staged files and resume
    Continue,
    /// Wipe incoming and retired, then start over
    Restart,
    /// Abort the run
    Stop,
}

/// Operator decision when the retired directory is not empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetiredDecision {
    /// Delete the retired contents first
    Delete,
    /// Keep the retired contents, they were already dealt with
    Continue,
    /// Abort the run
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_snapshot_identity_ignores_size_and_hash() {
        let a = FileSnapshot::new("a.zip").with_size(10).with_hash("aa");
        let b = FileSnapshot::new("  a.zip ").with_size(999);

        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    proptest! {
        #[test]
        fn test_equality_contract(name in "[a-z]{1,10}", s1 in any::<u64>(), s2 in any::<u64>(), pad in " {0,3}") {
            let a = FileSnapshot::new(&name).with_size(s1);
            let b = FileSnapshot::new(format!("{}{}{}", pad, name, pad)).with_size(s2);
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn test_repository_snapshot_lookup_is_trimmed() {
        let snapshot: RepositorySnapshot = vec![
            FileSnapshot::new("b.zip").with_size(2),
            FileSnapshot::new("a.zip").with_size(1),
        ]
        .into_iter()
        .collect();

        assert!(snapshot.contains(" a.zip"));
        assert_eq!(snapshot.get("b.zip").and_then(|f| f.size), Some(2));
        let names: Vec<_> = snapshot.names().into_iter().collect();
        assert_eq!(names, vec!["a.zip", "b.zip"]);
    }

    #[test]
    fn test_diff_plan_is_sorted() {
        let plan = DiffPlan::new(
            vec![FileSnapshot::new("z"), FileSnapshot::new("a")],
            vec![FileSnapshot::new("m"), FileSnapshot::new("b")],
        );
        assert_eq!(plan.to_delete[0].name, "a");
        assert_eq!(plan.to_download[0].name, "b");
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_report_sort_is_stable() {
        let mut report = Report::from(vec![
            ReportItem::error("b", "first"),
            ReportItem::info("a", "only"),
            ReportItem::warning("b", "second"),
        ]);
        report.sort_by_name();

        let comments: Vec<_> = report.iter().map(|i| i.comment.as_str()).collect();
        assert_eq!(comments, vec!["only", "first", "second"]);
        assert_eq!(report.count(ReportStatus::Error), 1);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ReportStatus::ImportantInfo.to_string(), "IMPORTANT_INFO");
        assert_eq!(format!("{:<8}|", ReportStatus::Info), "INFO    |");
        assert!(ReportStatus::Fatal.is_failure());
        assert!(!ReportStatus::Warning.is_failure());
    }
}

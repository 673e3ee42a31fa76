//! Synchronization stages for repomirror
//!
//! This crate provides the stages a mirror run is composed of. Each stage sits
//! behind its own trait in [`ports`] so the controller can be wired with test
//! doubles:
//!
//! - **Snapshots**: Top-level listings of a local directory or the remote repository
//! - **Diff planning**: Set algebra over two snapshots, with add-list and stop-list adjustment
//! - **Staged transfer**: Downloads into an incoming directory, resuming partial files
//! - **Validation**: The staged content is checked against a fresh remote snapshot
//! - **Commit**: Superseded files are retired, staged files are promoted atomically
//! - **Execution gate**: At most one run per day when requested
//! - **Repository validation**: No component may be present in two versions
//!
//! # Examples
//!
//! ```rust
//! use repomirror_config::SyncConfig;
//! use repomirror_sync::{DiffPlanner, ListDiffPlanner, RunContext};
//! use repomirror_types::{FileSnapshot, RepositorySnapshot};
//!
//! let ctx = RunContext::new(SyncConfig::new("ftp.example.org", "/srv/mirror"));
//! let local = RepositorySnapshot::new();
//! let remote: RepositorySnapshot = vec![FileSnapshot::new("a_1.zip").with_size(100)]
//!     .into_iter()
//!     .collect();
//!
//! let outcome = ListDiffPlanner.plan(&ctx, &local, &remote);
//! assert_eq!(outcome.plan.to_download.len(), 1);
//! assert!(outcome.is_valid);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod commit;
pub mod context;
pub mod fsops;
pub mod gate;
pub mod hash;
pub mod planner;
pub mod ports;
pub mod repository;
pub mod snapshot;
pub mod transfer;
pub mod validator;

pub use commit::RetiringCommitter;
pub use context::RunContext;
pub use gate::StampFileGate;
pub use planner::ListDiffPlanner;
pub use ports::{
    CommitOutcome, Committer, DiffPlanner, ExecutionGate, PlanOutcome, SnapshotService,
    TransferHalt, TransferOrchestrator, TransferOutcome, ValidationOutcome, Validator,
};
pub use repository::RepositoryValidator;
pub use snapshot::FsSnapshotService;
pub use transfer::StagedTransfer;
pub use validator::StagedValidator;

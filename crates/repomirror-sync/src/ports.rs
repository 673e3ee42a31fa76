//! Stage interfaces
//!
//! One trait per stage, each with a single operation. The controller owns one
//! boxed implementation of each and runs them in order.

use crate::RunContext;
use repomirror_types::{
    DiffPlan, DownloadProgress, ExecutionChoice, RemoteRepository, Report, RepositorySnapshot,
    Result, SnapshotMode,
};
use std::collections::BTreeSet;
use std::path::Path;

/// Builds snapshots of the local and the remote side
pub trait SnapshotService {
    /// Snapshot the regular files directly inside `dir`
    fn local(
        &self,
        dir: &Path,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot>;

    /// Snapshot the remote repository
    fn remote(
        &self,
        repo: &mut dyn RemoteRepository,
        filter: Option<&BTreeSet<String>>,
        mode: SnapshotMode,
    ) -> Result<RepositorySnapshot>;
}

/// Result of planning
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    /// Files to retire and to download
    pub plan: DiffPlan,
    /// False when the stop-list held back a file that was due
    pub is_valid: bool,
    /// Warnings and notes produced while planning
    pub report: Report,
}

/// Turns two snapshots into a plan
pub trait DiffPlanner {
    /// Plan the changes that make `local` match `remote`
    fn plan(
        &self,
        ctx: &RunContext,
        local: &RepositorySnapshot,
        remote: &RepositorySnapshot,
    ) -> PlanOutcome;
}

/// Why a transfer ended before downloading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferHalt {
    /// The operator chose STOP
    OperatorStop,
    /// The incoming directory holds something other than regular files
    UnsafeStaging,
}

/// Result of the transfer stage
#[derive(Debug, Clone, Default)]
pub struct TransferOutcome {
    /// Per-file failures and fatal findings
    pub report: Report,
    /// Set when the stage ended early
    pub halt: Option<TransferHalt>,
}

impl TransferOutcome {
    /// Every planned file was downloaded and nothing was reported
    pub fn is_success(&self) -> bool {
        self.halt.is_none() && self.report.is_empty()
    }
}

/// Stages the planned downloads
pub trait TransferOrchestrator {
    /// Bring the incoming directory to hold exactly the planned downloads
    fn transfer(
        &self,
        ctx: &RunContext,
        plan: &DiffPlan,
        repo: &mut dyn RemoteRepository,
        progress: &mut dyn DownloadProgress,
    ) -> Result<TransferOutcome>;
}

/// Result of post-transfer validation
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// True when nothing was reported
    pub ok: bool,
    /// Discrepancies
    pub report: Report,
}

/// Checks the staged files against the remote side
pub trait Validator {
    /// Compare the staged snapshot with the remote one for the planned names
    fn validate(
        &self,
        ctx: &RunContext,
        plan: &DiffPlan,
        staged: &RepositorySnapshot,
        remote: &RepositorySnapshot,
    ) -> ValidationOutcome;
}

/// Result of the commit stage
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// The live directory now mirrors the remote one
    Committed(Report),
    /// The operator chose STOP
    Stopped,
}

/// Promotes staged files into the live directory
pub trait Committer {
    /// Retire superseded files and promote the staged ones
    fn commit(&self, ctx: &RunContext, plan: &DiffPlan) -> Result<CommitOutcome>;
}

/// Once-per-day gate
pub trait ExecutionGate {
    /// Decide whether this run goes ahead
    fn check(&self, ctx: &RunContext) -> ExecutionChoice;

    /// Remember that a run completed today
    fn record_run(&self, ctx: &RunContext);
}

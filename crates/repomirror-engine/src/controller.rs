//! Mirror run controller

use crate::report::ReportAggregator;
use repomirror_config::VerifyMode;
use repomirror_sync::{
    CommitOutcome, Committer, DiffPlanner, ExecutionGate, FsSnapshotService, ListDiffPlanner,
    RepositoryValidator, RetiringCommitter, RunContext, SnapshotService, StagedTransfer,
    StagedValidator, StampFileGate, TransferHalt, TransferOrchestrator, Validator,
};
use repomirror_types::{
    DownloadProgress, ExecutionChoice, OperatorPrompt, RemoteRepository, Report, ReportItem,
    RepositorySnapshot, Result, SnapshotMode,
};
use std::rc::Rc;
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The gate found a run already happened today
    Skipped,
    /// The operator chose STOP at one of the prompts
    Aborted {
        /// Everything reported up to the stop
        report: Report,
    },
    /// Every stage ran
    Completed {
        /// True when the live directory now mirrors the remote one
        synchronized: bool,
        /// Merged report of all stages
        report: Report,
    },
}

impl RunOutcome {
    /// The run's report, if it got past the gate
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Skipped => None,
            Self::Aborted { report } | Self::Completed { report, .. } => Some(report),
        }
    }

    /// Whether the repositories are in sync
    pub fn is_synchronized(&self) -> bool {
        matches!(self, Self::Completed { synchronized: true, .. })
    }
}

/// Runs the stages of one mirror run in order
///
/// The run connects only after the gate says RUN and always closes the
/// session again. Commit happens only when the plan held nothing back, every
/// download succeeded and validation found nothing; only then is the run
/// recorded with the gate.
pub struct SyncController {
    snapshots: Box<dyn SnapshotService>,
    planner: Box<dyn DiffPlanner>,
    transfer: Box<dyn TransferOrchestrator>,
    validator: Box<dyn Validator>,
    committer: Box<dyn Committer>,
    gate: Box<dyn ExecutionGate>,
    repository: RepositoryValidator,
}

impl SyncController {
    /// Create a controller from explicit stages
    pub fn new(
        snapshots: Box<dyn SnapshotService>,
        planner: Box<dyn DiffPlanner>,
        transfer: Box<dyn TransferOrchestrator>,
        validator: Box<dyn Validator>,
        committer: Box<dyn Committer>,
        gate: Box<dyn ExecutionGate>,
    ) -> Self {
        Self {
            snapshots,
            planner,
            transfer,
            validator,
            committer,
            gate,
            repository: RepositoryValidator,
        }
    }

    /// Execute one run against `repo`
    pub fn run(
        &self,
        ctx: &RunContext,
        repo: &mut dyn RemoteRepository,
        progress: &mut dyn DownloadProgress,
    ) -> Result<RunOutcome> {
        if self.gate.check(ctx) == ExecutionChoice::Skip {
            info!("Skipping run, already synchronized today");
            return Ok(RunOutcome::Skipped);
        }

        repo.connect()?;
        let result = self.run_connected(ctx, repo, progress);
        repo.close();
        result
    }

    fn run_connected(
        &self,
        ctx: &RunContext,
        repo: &mut dyn RemoteRepository,
        progress: &mut dyn DownloadProgress,
    ) -> Result<RunOutcome> {
        let mut aggregator = ReportAggregator::new();

        info!("Comparing {} with the remote repository", ctx.local_dir().display());
        let local = self.snapshots.local(ctx.local_dir(), None, SnapshotMode::Lite)?;
        let remote = self.snapshots.remote(repo, None, SnapshotMode::Lite)?;

        let planned = self.planner.plan(ctx, &local, &remote);
        aggregator.add("plan", planned.report);
        let plan = planned.plan;

        info!("Staging {} files", plan.to_download.len());
        let transfer = self.transfer.transfer(ctx, &plan, repo, progress)?;
        let transfer_ok = transfer.is_success();
        aggregator.add("transfer", transfer.report);

        match transfer.halt {
            Some(TransferHalt::OperatorStop) => {
                warn!("Run stopped by operator before downloading");
                return self.aborted(ctx, aggregator);
            }
            Some(TransferHalt::UnsafeStaging) => {
                warn!("Incoming directory is unsafe to use, skipping validation and commit");
                return self.completed(ctx, aggregator, false);
            }
            None => {}
        }

        let downloads = plan.download_names();
        let mode = if !downloads.is_empty() && ctx.config().verify_mode == VerifyMode::Md5Hash {
            SnapshotMode::Full
        } else {
            SnapshotMode::Lite
        };
        let staged = self.snapshots.local(&ctx.incoming_dir(), None, mode)?;
        let remote_scoped = if downloads.is_empty() {
            RepositorySnapshot::new()
        } else {
            self.snapshots.remote(repo, Some(&downloads), mode)?
        };

        let validation = self.validator.validate(ctx, &plan, &staged, &remote_scoped);
        aggregator.add("validate", validation.report);

        if !(planned.is_valid && transfer_ok && validation.ok) {
            warn!(
                "Not committing: plan complete {}, transfer ok {}, validation ok {}",
                planned.is_valid, transfer_ok, validation.ok
            );
            return self.completed(ctx, aggregator, false);
        }

        match self.committer.commit(ctx, &plan)? {
            CommitOutcome::Committed(report) => {
                aggregator.add("commit", report);
                self.gate.record_run(ctx);
                self.completed(ctx, aggregator, true)
            }
            CommitOutcome::Stopped => {
                warn!("Run stopped by operator before commit");
                aggregator.add(
                    "commit",
                    Report::from(vec![ReportItem::fatal(
                        ctx.retired_dir().display().to_string(),
                        "retired directory is not empty, stopped by operator",
                    )]),
                );
                self.aborted(ctx, aggregator)
            }
        }
    }

    fn aborted(&self, ctx: &RunContext, mut aggregator: ReportAggregator) -> Result<RunOutcome> {
        aggregator.add("repository", self.repository.validate(ctx.local_dir())?);
        Ok(RunOutcome::Aborted {
            report: aggregator.finish(),
        })
    }

    fn completed(
        &self,
        ctx: &RunContext,
        mut aggregator: ReportAggregator,
        committed: bool,
    ) -> Result<RunOutcome> {
        aggregator.add("repository", self.repository.validate(ctx.local_dir())?);
        let synchronized = committed && !aggregator.has_errors();
        info!(
            "Run finished, repositories {}",
            if synchronized { "in sync" } else { "not in sync" }
        );
        Ok(RunOutcome::Completed {
            synchronized,
            report: aggregator.finish(),
        })
    }
}

/// Builder for [`SyncController`] with production stages as defaults
pub struct ControllerBuilder {
    prompt: Rc<dyn OperatorPrompt>,
    snapshots: Option<Box<dyn SnapshotService>>,
    planner: Option<Box<dyn DiffPlanner>>,
    transfer: Option<Box<dyn TransferOrchestrator>>,
    validator: Option<Box<dyn Validator>>,
    committer: Option<Box<dyn Committer>>,
    gate: Option<Box<dyn ExecutionGate>>,
}

impl ControllerBuilder {
    /// Create a builder; `prompt` resolves leftovers in incoming and retired
    pub fn new(prompt: Rc<dyn OperatorPrompt>) -> Self {
        Self {
            prompt,
            snapshots: None,
            planner: None,
            transfer: None,
            validator: None,
            committer: None,
            gate: None,
        }
    }

    /// Replace the snapshot service
    pub fn with_snapshots(mut self, snapshots: Box<dyn SnapshotService>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Replace the planner
    pub fn with_planner(mut self, planner: Box<dyn DiffPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Replace the transfer stage
    pub fn with_transfer(mut self, transfer: Box<dyn TransferOrchestrator>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Replace the validator
    pub fn with_validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replace the committer
    pub fn with_committer(mut self, committer: Box<dyn Committer>) -> Self {
        self.committer = Some(committer);
        self
    }

    /// Replace the execution gate
    pub fn with_gate(mut self, gate: Box<dyn ExecutionGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Build the controller
    pub fn build(self) -> SyncController {
        let prompt = self.prompt;
        SyncController::new(
            self.snapshots.unwrap_or_else(|| Box::new(FsSnapshotService)),
            self.planner.unwrap_or_else(|| Box::new(ListDiffPlanner)),
            self.transfer
                .unwrap_or_else(|| Box::new(StagedTransfer::new(Rc::clone(&prompt)))),
            self.validator.unwrap_or_else(|| Box::new(StagedValidator)),
            self.committer
                .unwrap_or_else(|| Box::new(RetiringCommitter::new(Rc::clone(&prompt)))),
            self.gate.unwrap_or_else(|| Box::new(StampFileGate::new())),
        )
    }
}

//! Promotion of the staged files into the live repository

use crate::fsops;
use crate::ports::{CommitOutcome, Committer};
use crate::RunContext;
use repomirror_types::{DiffPlan, Error, OperatorPrompt, Report, ReportItem, Result, RetiredDecision};
use std::rc::Rc;
use tracing::{info, warn};

/// Retires superseded files, then promotes incoming
///
/// Retiring is a rename, so the live and retired directories must share a
/// volume. Leftovers in retired are cleared before anything moves, whether
/// the operator deletes them or has saved them already, so a retirement
/// never collides. Promotion copies through a temporary name and renames
/// over the live file, so a crash never leaves a half-written file in place.
pub struct RetiringCommitter {
    prompt: Rc<dyn OperatorPrompt>,
}

impl RetiringCommitter {
    /// Create the stage with the operator who resolves retired leftovers
    pub fn new(prompt: Rc<dyn OperatorPrompt>) -> Self {
        Self { prompt }
    }
}

impl Committer for RetiringCommitter {
    fn commit(&self, ctx: &RunContext, plan: &DiffPlan) -> Result<CommitOutcome> {
        let live = ctx.local_dir();
        let incoming = ctx.incoming_dir();
        let retired = ctx.retired_dir();
        fsops::ensure_dir(&retired)?;

        if !fsops::same_volume(live, &retired)? {
            return Err(Error::config(format!(
                "'{}' and '{}' must be on the same volume",
                live.display(),
                retired.display()
            )));
        }

        if !plan.to_delete.is_empty() {
            let leftovers = fsops::entries(&retired)?;
            if !leftovers.is_empty() {
                match self.prompt.resolve_retired(&retired, leftovers.len())? {
                    RetiredDecision::Delete => {
                        info!("Deleting {} retired files", leftovers.len());
                        fsops::clean_dir(&retired)?;
                    }
                    RetiredDecision::Continue => {
                        info!(
                            "Retired files were saved by the operator, clearing {}",
                            retired.display()
                        );
                        fsops::clean_dir(&retired)?;
                    }
                    RetiredDecision::Stop => return Ok(CommitOutcome::Stopped),
                }
            }
        }

        let mut moved = 0_usize;
        for file in &plan.to_delete {
            let path = live.join(&file.name);
            if !path.exists() {
                warn!("{} vanished before it could be retired", path.display());
                continue;
            }
            fsops::move_into(&path, &retired)?;
            moved += 1;
        }

        let mut promoted = 0_usize;
        for path in fsops::entries(&incoming)? {
            if fsops::is_regular_file(&path)? {
                fsops::copy_atomic(&path, live)?;
                promoted += 1;
            }
        }
        fsops::clean_dir(&incoming)?;

        info!("Retired {} files, promoted {} files", moved, promoted);

        let mut report = Report::new();
        report.push(ReportItem::info(
            retired.display().to_string(),
            format!("{} files moved to retired directory", moved),
        ));
        report.push(ReportItem::info(
            live.display().to_string(),
            format!("{} files promoted from incoming directory", promoted),
        ));
        Ok(CommitOutcome::Committed(report))
    }
}

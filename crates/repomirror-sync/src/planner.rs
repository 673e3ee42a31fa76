//! Diff planning
//!
//! Planning is pure set algebra over two snapshots keyed by name:
//!
//! 1. Local-only names are retired, remote-only names are downloaded.
//! 2. Add-list names present on the server are downloaded even when a local
//!    copy exists; that copy is retired.
//! 3. Names on both sides whose sizes differ are retired and downloaded.
//! 4. With the stop-list active, downloads whose component key is listed are
//!    held back, together with the retirement of their local copy.
//!
//! Hashes are not compared here; that is left to post-transfer validation.

use crate::ports::{DiffPlanner, PlanOutcome};
use crate::RunContext;
use repomirror_types::{
    component_key, DiffPlan, Report, ReportItem, RepositorySnapshot, StopListMode,
};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Comment attached to every stop-listed download
pub const STOP_LIST_COMMENT: &str =
    "scheduled for download but in stop list; will not be downloaded";

/// Comment of the single item emitted when nothing has to change
pub const NOTHING_TO_DO_COMMENT: &str = "nothing to do, repositories are identical";

/// Set-based planner
#[derive(Debug, Clone, Copy, Default)]
pub struct ListDiffPlanner;

impl DiffPlanner for ListDiffPlanner {
    fn plan(
        &self,
        ctx: &RunContext,
        local: &RepositorySnapshot,
        remote: &RepositorySnapshot,
    ) -> PlanOutcome {
        let config = ctx.config();
        let local_names = local.names();
        let remote_names = remote.names();

        let mut to_delete: BTreeSet<&str> = local_names.difference(&remote_names).copied().collect();
        let mut to_download: BTreeSet<&str> =
            remote_names.difference(&local_names).copied().collect();

        for name in config.add_list.iter().map(|name| name.trim()) {
            if remote.contains(name) {
                to_download.insert(name);
                if local.contains(name) {
                    to_delete.insert(name);
                }
            } else if !name.is_empty() {
                warn!("Add-list entry {} is not on the server", name);
            }
        }

        for name in local_names.intersection(&remote_names).copied() {
            let local_size = local.get(name).and_then(|f| f.size);
            let remote_size = remote.get(name).and_then(|f| f.size);
            if local_size != remote_size {
                debug!("{} changed size: {:?} -> {:?}", name, local_size, remote_size);
                to_delete.insert(name);
                to_download.insert(name);
            }
        }

        let mut report = Report::new();
        let mut excluded = 0_usize;
        if ctx.stop_list_mode() == StopListMode::UseStopList {
            let stopped: BTreeSet<String> = config
                .stop_list
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(component_key)
                .collect();

            let held_back: Vec<&str> = to_download
                .iter()
                .copied()
                .filter(|name| stopped.contains(&component_key(name)))
                .collect();

            for name in held_back {
                warn!("{} is in the stop list, not downloading", name);
                to_download.remove(name);
                if local.contains(name) {
                    to_delete.remove(name);
                }
                report.push(ReportItem::warning(name, STOP_LIST_COMMENT));
                excluded += 1;
            }
        }

        let plan = DiffPlan::new(
            to_delete
                .iter()
                .filter_map(|name| local.get(name).cloned())
                .collect(),
            to_download
                .iter()
                .filter_map(|name| remote.get(name).cloned())
                .collect(),
        );

        if plan.is_empty() && excluded == 0 {
            report.push(ReportItem::important("", NOTHING_TO_DO_COMMENT));
        }

        info!(
            "Plan: {} to download, {} to retire, {} held back",
            plan.to_download.len(),
            plan.to_delete.len(),
            excluded
        );

        PlanOutcome {
            plan,
            is_valid: excluded == 0,
            report,
        }
    }
}

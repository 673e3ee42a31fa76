//! Post-transfer validation of the staged files

use crate::ports::{ValidationOutcome, Validator};
use crate::RunContext;
use repomirror_config::VerifyMode;
use repomirror_types::{DiffPlan, FileSnapshot, Report, ReportItem, RepositorySnapshot};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Checks that incoming holds exactly the planned files, intact
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedValidator;

fn describe(size: Option<u64>) -> String {
    size.map_or_else(|| "unknown".to_string(), |size| size.to_string())
}

fn normalize(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}

fn compare(staged: &FileSnapshot, remote: &FileSnapshot, mode: VerifyMode, report: &mut Report) {
    if staged.size != remote.size {
        report.push(ReportItem::error(
            &staged.name,
            format!(
                "size mismatch: staged {} bytes, remote {} bytes",
                describe(staged.size),
                describe(remote.size)
            ),
        ));
    }

    if mode == VerifyMode::Md5Hash {
        match (&staged.hash, &remote.hash) {
            (Some(ours), Some(theirs)) if normalize(ours) == normalize(theirs) => {}
            (Some(ours), Some(theirs)) => report.push(ReportItem::error(
                &staged.name,
                format!("hash mismatch: staged {}, remote {}", ours.trim(), theirs.trim()),
            )),
            (None, _) => report.push(ReportItem::error(
                &staged.name,
                "cannot verify: staged hash missing",
            )),
            (_, None) => report.push(ReportItem::error(
                &staged.name,
                "cannot verify: remote hash missing",
            )),
        }
    }
}

impl Validator for StagedValidator {
    fn validate(
        &self,
        ctx: &RunContext,
        plan: &DiffPlan,
        staged: &RepositorySnapshot,
        remote: &RepositorySnapshot,
    ) -> ValidationOutcome {
        let mode = ctx.config().verify_mode;
        let expected = plan.download_names();
        let present: BTreeSet<String> = staged.names().into_iter().map(str::to_string).collect();
        let mut report = Report::new();

        for name in expected.difference(&present) {
            report.push(ReportItem::error(name, "not downloaded"));
        }

        for name in present.difference(&expected) {
            warn!("Unexpected {} in the incoming directory", name);
            report.push(ReportItem::fatal(name, "unexpected object in incoming directory"));
        }

        for name in expected.intersection(&present) {
            let Some(staged_file) = staged.get(name) else {
                continue;
            };
            match remote.get(name) {
                Some(remote_file) => compare(staged_file, remote_file, mode, &mut report),
                None => report.push(ReportItem::error(
                    name,
                    "cannot verify: missing from remote listing",
                )),
            }
        }

        info!(
            "Validated {} staged files, {} problems",
            present.len(),
            report.len()
        );

        ValidationOutcome {
            ok: report.is_empty(),
            report,
        }
    }
}

//! Staged downloads into the incoming directory

use crate::fsops;
use crate::ports::{TransferHalt, TransferOrchestrator, TransferOutcome};
use crate::RunContext;
use repomirror_types::{
    DiffPlan, DownloadProgress, Error, IncomingDecision, OperatorPrompt, RemoteRepository, Report,
    ReportItem, Result,
};
use std::fs;
use std::rc::Rc;
use tracing::{error, info, warn};

/// Downloads the plan into the incoming directory
///
/// Leftovers from an interrupted run are resolved by the operator before
/// anything is fetched. Partial files are kept so the transport can resume
/// them; empty ones are dropped since there is nothing to resume.
pub struct StagedTransfer {
    prompt: Rc<dyn OperatorPrompt>,
}

impl StagedTransfer {
    /// Create the stage with the operator who resolves leftovers
    pub fn new(prompt: Rc<dyn OperatorPrompt>) -> Self {
        Self { prompt }
    }

    fn sanitize(incoming: &std::path::Path, report: &mut Report) -> Result<bool> {
        for path in fsops::entries(incoming)? {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            if !fsops::is_regular_file(&path)? {
                error!("{} in the incoming directory is not a regular file", path.display());
                report.push(ReportItem::fatal(
                    name,
                    "not a regular file in incoming directory",
                ));
                return Ok(false);
            }

            let length = fs::metadata(&path)
                .map_err(|e| Error::local("inspect", &path, e))?
                .len();
            if length == 0 {
                info!("Removing empty leftover {}", path.display());
                fs::remove_file(&path).map_err(|e| Error::local("delete", &path, e))?;
            }
        }
        Ok(true)
    }
}

impl TransferOrchestrator for StagedTransfer {
    fn transfer(
        &self,
        ctx: &RunContext,
        plan: &DiffPlan,
        repo: &mut dyn RemoteRepository,
        progress: &mut dyn DownloadProgress,
    ) -> Result<TransferOutcome> {
        let incoming = ctx.incoming_dir();
        let retired = ctx.retired_dir();
        for dir in [ctx.local_dir(), incoming.as_path(), retired.as_path()] {
            fsops::ensure_dir(dir)?;
        }

        let mut report = Report::new();

        let leftovers = fsops::entries(&incoming)?;
        if !leftovers.is_empty() {
            warn!(
                "{} holds {} entries from an earlier run",
                incoming.display(),
                leftovers.len()
            );
            match self.prompt.resolve_incoming(&incoming, leftovers.len())? {
                IncomingDecision::Stop => {
                    report.push(ReportItem::fatal(
                        incoming.display().to_string(),
                        "incoming directory is not empty, stopped by operator",
                    ));
                    return Ok(TransferOutcome {
                        report,
                        halt: Some(TransferHalt::OperatorStop),
                    });
                }
                IncomingDecision::Restart => {
                    info!("Restarting: clearing incoming and retired directories");
                    fsops::clean_dir(&incoming)?;
                    fsops::clean_dir(&retired)?;
                }
                IncomingDecision::Continue => info!("Continuing with staged files"),
            }
        }

        if !Self::sanitize(&incoming, &mut report)? {
            return Ok(TransferOutcome {
                report,
                halt: Some(TransferHalt::UnsafeStaging),
            });
        }

        for file in &plan.to_download {
            let destination = incoming.join(&file.name);
            match repo.download_file(file, &destination, progress) {
                Ok(()) => info!("Downloaded {}", file.name),
                Err(e) => {
                    error!("{}", e);
                    report.push(ReportItem::error(
                        &file.name,
                        format!("file not downloaded: {}", e),
                    ));
                }
            }
        }

        Ok(TransferOutcome { report, halt: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomirror_config::SyncConfig;
    use repomirror_types::{
        FileSnapshot, NoProgress, RepositorySnapshot, RetiredDecision, SnapshotMode,
    };
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;
    use tempfile::TempDir;

    struct Canned(IncomingDecision);

    impl OperatorPrompt for Canned {
        fn resolve_incoming(&self, _incoming: &Path, _entries: usize) -> Result<IncomingDecision> {
            Ok(self.0)
        }

        fn resolve_retired(&self, _retired: &Path, _entries: usize) -> Result<RetiredDecision> {
            Ok(RetiredDecision::Stop)
        }
    }

    /// Serves files from memory and records the resume offsets it saw
    #[derive(Default)]
    struct MemoryRemote {
        files: BTreeMap<String, Vec<u8>>,
        offsets: RefCell<Vec<(String, u64)>>,
    }

    impl RemoteRepository for MemoryRemote {
        fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) {}

        fn download_dir(
            &mut self,
            _filter: Option<&BTreeSet<String>>,
            _mode: SnapshotMode,
        ) -> Result<RepositorySnapshot> {
            Ok(RepositorySnapshot::new())
        }

        fn download_file(
            &mut self,
            file: &FileSnapshot,
            destination: &Path,
            _progress: &mut dyn DownloadProgress,
        ) -> Result<()> {
            let data = self
                .files
                .get(&file.name)
                .ok_or_else(|| Error::download(&file.name, "550 not found"))?;
            let offset = fs::metadata(destination).map(|m| m.len()).unwrap_or(0);
            self.offsets.borrow_mut().push((file.name.clone(), offset));
            let mut content = fs::read(destination).unwrap_or_default();
            content.extend_from_slice(&data[usize::try_from(offset).unwrap()..]);
            fs::write(destination, content).map_err(|e| Error::local("write", destination, e))
        }
    }

    fn setup(decision: IncomingDecision) -> (TempDir, RunContext, StagedTransfer) {
        let dir = TempDir::new().unwrap();
        let config = SyncConfig::new("ftp.example.org", dir.path().join("live"));
        let ctx = RunContext::new(config);
        (dir, ctx, StagedTransfer::new(Rc::new(Canned(decision))))
    }

    fn remote(files: &[(&str, &[u8])]) -> MemoryRemote {
        MemoryRemote {
            files: files
                .iter()
                .map(|(name, data)| (name.to_string(), data.to_vec()))
                .collect(),
            ..MemoryRemote::default()
        }
    }

    fn plan(files: &[(&str, u64)]) -> DiffPlan {
        DiffPlan::new(
            Vec::new(),
            files
                .iter()
                .map(|(name, size)| FileSnapshot::new(name).with_size(*size))
                .collect(),
        )
    }

    #[test]
    fn test_downloads_into_incoming_and_creates_dirs() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Stop);
        let mut repo = remote(&[("a_1.zip", b"aaa"), ("b_1.zip", b"bb")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 3), ("b_1.zip", 2)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert!(outcome.is_success());
        assert!(ctx.retired_dir().is_dir());
        assert_eq!(fs::read(ctx.incoming_dir().join("a_1.zip")).unwrap(), b"aaa");
        assert_eq!(fs::read(ctx.incoming_dir().join("b_1.zip")).unwrap(), b"bb");
    }

    #[test]
    fn test_single_failure_does_not_stop_siblings() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Stop);
        let mut repo = remote(&[("b_1.zip", b"bb")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 3), ("b_1.zip", 2)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert!(!outcome.is_success());
        assert!(outcome.halt.is_none());
        assert_eq!(outcome.report.len(), 1);
        let item = outcome.report.iter().next().unwrap();
        assert_eq!(item.name, "a_1.zip");
        assert!(item.comment.starts_with("file not downloaded"));
        assert!(ctx.incoming_dir().join("b_1.zip").exists());
    }

    #[test]
    fn test_stop_leaves_incoming_untouched() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Stop);
        fs::create_dir_all(ctx.incoming_dir()).unwrap();
        fs::write(ctx.incoming_dir().join("a_1.zip"), b"a").unwrap();
        let mut repo = remote(&[("a_1.zip", b"aaa")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 3)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert_eq!(outcome.halt, Some(TransferHalt::OperatorStop));
        assert!(outcome.report.has_errors());
        assert!(repo.offsets.borrow().is_empty());
        assert_eq!(fs::read(ctx.incoming_dir().join("a_1.zip")).unwrap(), b"a");
    }

    #[test]
    fn test_continue_resumes_partial_file() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Continue);
        fs::create_dir_all(ctx.incoming_dir()).unwrap();
        fs::write(ctx.incoming_dir().join("a_1.zip"), b"012").unwrap();
        let mut repo = remote(&[("a_1.zip", b"0123456")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 7)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(*repo.offsets.borrow(), vec![("a_1.zip".to_string(), 3)]);
        assert_eq!(fs::read(ctx.incoming_dir().join("a_1.zip")).unwrap(), b"0123456");
    }

    #[test]
    fn test_restart_clears_holding_dirs() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Restart);
        fs::create_dir_all(ctx.incoming_dir()).unwrap();
        fs::create_dir_all(ctx.retired_dir()).unwrap();
        fs::write(ctx.incoming_dir().join("a_1.zip"), b"012").unwrap();
        fs::write(ctx.retired_dir().join("old_1.zip"), b"old").unwrap();
        let mut repo = remote(&[("a_1.zip", b"0123456")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 7)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(*repo.offsets.borrow(), vec![("a_1.zip".to_string(), 0)]);
        assert!(fsops::entries(&ctx.retired_dir()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_leftovers_are_removed() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Continue);
        fs::create_dir_all(ctx.incoming_dir()).unwrap();
        fs::write(ctx.incoming_dir().join("stale_1.zip"), b"").unwrap();
        let mut repo = remote(&[]);

        let outcome = stage
            .transfer(&ctx, &DiffPlan::default(), &mut repo, &mut NoProgress)
            .unwrap();

        assert!(outcome.is_success());
        assert!(!ctx.incoming_dir().join("stale_1.zip").exists());
    }

    #[test]
    fn test_directory_in_incoming_is_fatal() {
        let (_dir, ctx, stage) = setup(IncomingDecision::Continue);
        fs::create_dir_all(ctx.incoming_dir().join("nested")).unwrap();
        let mut repo = remote(&[("a_1.zip", b"a")]);

        let outcome = stage
            .transfer(&ctx, &plan(&[("a_1.zip", 1)]), &mut repo, &mut NoProgress)
            .unwrap();

        assert_eq!(outcome.halt, Some(TransferHalt::UnsafeStaging));
        assert!(outcome.report.has_errors());
        assert!(repo.offsets.borrow().is_empty());
    }
}

//! Once-per-day execution gate

use crate::ports::ExecutionGate;
use crate::RunContext;
use chrono::{Local, NaiveDate};
use repomirror_types::ExecutionChoice;
use std::fs;
use tracing::{debug, info, warn};

const STAMP_FORMAT: &str = "%Y-%m-%d";

/// Gate backed by a stamp file holding the date of the last good run
///
/// A missing or unreadable stamp never blocks a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampFileGate {
    today: Option<NaiveDate>,
}

impl StampFileGate {
    /// Gate that uses the local calendar date
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate pinned to a fixed date
    pub fn with_date(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    fn today(&self) -> String {
        self.today
            .unwrap_or_else(|| Local::now().date_naive())
            .format(STAMP_FORMAT)
            .to_string()
    }
}

impl ExecutionGate for StampFileGate {
    fn check(&self, ctx: &RunContext) -> ExecutionChoice {
        if !ctx.once_per_day() {
            return ExecutionChoice::Run;
        }

        let stamp_file = ctx.config().stamp_file();
        match fs::read_to_string(&stamp_file) {
            Ok(stamp) if stamp.trim() == self.today() => {
                info!("Already synchronized today ({})", stamp.trim());
                ExecutionChoice::Skip
            }
            Ok(_) => ExecutionChoice::Run,
            Err(e) => {
                debug!("No usable stamp at {}: {}", stamp_file.display(), e);
                ExecutionChoice::Run
            }
        }
    }

    fn record_run(&self, ctx: &RunContext) {
        let stamp_file = ctx.config().stamp_file();
        if let Some(parent) = stamp_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Cannot create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&stamp_file, format!("{}\n", self.today())) {
            warn!("Cannot write stamp {}: {}", stamp_file.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repomirror_config::SyncConfig;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(dir: &Path, once_per_day: bool) -> RunContext {
        let mut config = SyncConfig::new("ftp.example.org", dir.join("live"));
        config.date_file = Some(dir.join("state").join("date_file"));
        RunContext::new(config).with_once_per_day(once_per_day)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_disabled_gate_always_runs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), false);
        let gate = StampFileGate::with_date(day(1));

        gate.record_run(&ctx);
        assert_eq!(gate.check(&ctx), ExecutionChoice::Run);
    }

    #[test]
    fn test_missing_stamp_runs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), true);
        assert_eq!(StampFileGate::with_date(day(1)).check(&ctx), ExecutionChoice::Run);
    }

    #[test]
    fn test_same_day_skips_next_day_runs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), true);

        StampFileGate::with_date(day(1)).record_run(&ctx);
        assert_eq!(
            fs::read_to_string(ctx.config().stamp_file()).unwrap().trim(),
            "2024-03-01"
        );
        assert_eq!(StampFileGate::with_date(day(1)).check(&ctx), ExecutionChoice::Skip);
        assert_eq!(StampFileGate::with_date(day(2)).check(&ctx), ExecutionChoice::Run);
    }

    #[test]
    fn test_garbage_stamp_runs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path(), true);
        fs::create_dir_all(dir.path().join("state")).unwrap();
        fs::write(ctx.config().stamp_file(), "not a date").unwrap();

        assert_eq!(StampFileGate::with_date(day(1)).check(&ctx), ExecutionChoice::Run);
    }

    #[test]
    fn test_unwritable_stamp_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("state"), b"a file, not a directory").unwrap();
        let ctx = context(dir.path(), true);

        StampFileGate::with_date(day(1)).record_run(&ctx);
        assert_eq!(StampFileGate::with_date(day(1)).check(&ctx), ExecutionChoice::Run);
    }
}

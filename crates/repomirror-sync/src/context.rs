//! Immutable per-run context

use repomirror_config::SyncConfig;
use repomirror_types::StopListMode;
use std::path::{Path, PathBuf};

/// Everything a stage may read about the current run
///
/// Built once from the loaded configuration and the command line, then
/// passed by reference to every stage.
#[derive(Debug, Clone)]
pub struct RunContext {
    config: SyncConfig,
    once_per_day: bool,
    stop_list_mode: StopListMode,
}

impl RunContext {
    /// Create a context with the gate off and the stop-list ignored
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            once_per_day: false,
            stop_list_mode: StopListMode::default(),
        }
    }

    /// Enable or disable the once-per-day gate
    pub fn with_once_per_day(mut self, once_per_day: bool) -> Self {
        self.once_per_day = once_per_day;
        self
    }

    /// Choose whether the planner applies the stop-list
    pub fn with_stop_list_mode(mut self, mode: StopListMode) -> Self {
        self.stop_list_mode = mode;
        self
    }

    /// Loaded configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether the once-per-day gate is active
    pub fn once_per_day(&self) -> bool {
        self.once_per_day
    }

    /// Stop-list mode
    pub fn stop_list_mode(&self) -> StopListMode {
        self.stop_list_mode
    }

    /// Live repository directory
    pub fn local_dir(&self) -> &Path {
        &self.config.local_dir
    }

    /// Staging directory
    pub fn incoming_dir(&self) -> PathBuf {
        self.config.incoming_dir()
    }

    /// Directory for superseded files
    pub fn retired_dir(&self) -> PathBuf {
        self.config.retired_dir()
    }
}

//! Logging bootstrap
//!
//! Console output goes to stderr so the report on stdout stays clean. The log
//! file is written from a background worker; keep the returned guard alive
//! until the process ends or the tail of the log is lost.

use anyhow::{Context, Result};
use repomirror_config::{LogRotation, SyncConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Install the global subscriber
pub fn init(config: &SyncConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(&config.logging.console.level, verbose)?);

    let (file_layer, guard) = if config.logging.file.enabled {
        let path = config.log_file();
        let (writer, guard) = file_writer(&path, config.logging.file.rotation)?;
        let layer = fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(level_filter(&config.logging.file.level)?);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(guard)
}

fn console_filter(level: &str, verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return level_filter("debug");
    }
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => level_filter(level),
    }
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level))
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Hourly => Rotation::HOURLY,
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Log path '{}' has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

fn file_writer(path: &Path, policy: LogRotation) -> Result<(NonBlocking, WorkerGuard)> {
    let (dir, file_name) = split_log_path(path)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(policy))
        .filename_prefix(file_name)
        .build(&dir)
        .with_context(|| format!("Failed to open log file in '{}'", dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

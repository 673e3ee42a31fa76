//! Configuration builder for layered configuration loading

use crate::include::load_with_includes;
use crate::{ConfigError, ConfigResult, SyncConfig};
use config::{Environment, File, FileFormat};
use repomirror_types::BlockSize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration builder for loading configuration from a file and the environment
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
    env_separator: Option<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration file; its includes are resolved on build
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Set environment variable separator for nested keys (default: "__")
    pub fn env_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.env_separator = Some(separator.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<SyncConfig> {
        let mut inner = config::Config::builder();

        if let Some(path) = &self.file {
            let document = load_with_includes(path)?;
            let text = serde_yaml::to_string(&Value::Mapping(document))?;
            inner = inner.add_source(File::from_str(&text, FileFormat::Yaml));
        }

        if let Some(prefix) = &self.env_prefix {
            let separator = self.env_separator.as_deref().unwrap_or("__");
            inner = inner.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator(separator)
                    .try_parsing(true),
            );
        }

        let config = inner.build()?;
        let result: SyncConfig = config.try_deserialize()?;

        Self::validate(&result)?;

        Ok(result)
    }

    /// Validate the configuration
    pub fn validate(config: &SyncConfig) -> ConfigResult<()> {
        if config.ftp_host.trim().is_empty() {
            return Err(ConfigError::invalid_value("ftp_host", "must not be empty"));
        }

        if config.local_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("local_dir", "must not be empty"));
        }

        if !(config.ftp_timeout_sec.is_finite() && config.ftp_timeout_sec > 0.0) {
            return Err(ConfigError::invalid_value(
                "ftp_timeout_sec",
                "must be a positive number of seconds",
            ));
        }

        if config.ftp_repeat == 0 {
            return Err(ConfigError::invalid_value("ftp_repeat", "must be at least 1"));
        }

        if !(config.ftp_retry_delay_seconds.is_finite() && config.ftp_retry_delay_seconds >= 0.0) {
            return Err(ConfigError::invalid_value(
                "ftp_retry_delay_seconds",
                "must be zero or a positive number of seconds",
            ));
        }

        BlockSize::new(config.ftp_blocksize)
            .map_err(|message| ConfigError::invalid_value("ftp_blocksize", message))?;

        let command = config.ftp_hash_command.trim();
        if command.is_empty() || command.contains(char::is_whitespace) {
            return Err(ConfigError::invalid_value(
                "ftp_hash_command",
                "must be a single protocol command",
            ));
        }

        let incoming = config.incoming_dir();
        let retired = config.retired_dir();
        if incoming == config.local_dir || retired == config.local_dir || incoming == retired {
            return Err(ConfigError::validation(
                "local_dir, new_dir and old_dir must be three different directories",
            ));
        }

        for (key, level) in [
            ("logging.console.level", &config.logging.console.level),
            ("logging.file.level", &config.logging.file.level),
        ] {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::invalid_value(
                    key,
                    "must be one of: trace, debug, info, warn, error",
                ));
            }
        }

        Ok(())
    }
}

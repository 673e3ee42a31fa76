//! Configuration loader utilities

use crate::{ConfigBuilder, ConfigError, ConfigResult, SyncConfig};
use std::path::Path;

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "REPOMIRROR";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a specific file, with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<SyncConfig> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Configuration file not found",
                ),
            });
        }

        ConfigBuilder::new()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Render a configuration as YAML, e.g. for `--debug` dumps
    pub fn to_yaml(config: &SyncConfig) -> ConfigResult<String> {
        serde_yaml::to_string(config).map_err(|e| ConfigError::Serialization {
            message: format!("Failed to serialize to YAML: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file() {
        let result = ConfigLoader::load_from_file("/nonexistent/mirror.yaml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_with_include() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("site.yaml"),
            "ftp_host: ftp.example.org\nftp_root: /pub/\nstop_list: [AAA.zip]\n",
        )
        .unwrap();
        let path = dir.path().join("mirror.yaml");
        fs::write(&path, "include: site.yaml\nlocal_dir: /srv/mirror\nftp_root: /pub/updates/\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.ftp_host, "ftp.example.org");
        assert_eq!(config.ftp_root, "/pub/updates/");
        assert_eq!(config.stop_list, vec!["AAA.zip"]);
    }

    #[test]
    fn test_yaml_round_trip_keeps_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mirror.yaml");
        fs::write(&path, "ftp_host: ftp.example.org\nlocal_dir: /srv/mirror\nftp_repeat: 4\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        let yaml = ConfigLoader::to_yaml(&config).unwrap();
        assert!(yaml.contains("ftp_repeat: 4"));
        assert!(yaml.contains("local_dir: /srv/mirror"));
    }
}

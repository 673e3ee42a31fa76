//! Live repository consistency check

use repomirror_types::{component_key, Error, Report, ReportItem, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Reports components present in more than one version
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryValidator;

impl RepositoryValidator {
    /// Scan the regular files in `dir` and group them by component key
    pub fn validate(&self, dir: &Path) -> Result<Report> {
        let unreadable = |e: std::io::Error| {
            Error::config(format!("Cannot read directory '{}': {}", dir.display(), e))
        };

        let mut components: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().trim().to_string();
            components.entry(component_key(&name)).or_default().push(name);
        }

        let mut report = Report::new();
        for (key, mut names) in components {
            if names.len() > 1 {
                names.sort();
                warn!("Component {} is present {} times", key, names.len());
                report.push(ReportItem::error(
                    key,
                    format!("component present {} times: {}", names.len(), names.join(", ")),
                ));
            }
        }

        info!("Repository check found {} duplicated components", report.len());
        Ok(report)
    }
}

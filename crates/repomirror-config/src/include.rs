//! `include:` resolution for configuration files
//!
//! A file may name one base file or a list of them. Paths are relative to the
//! including file. Included documents are merged in order, so a later include
//! overrides an earlier one, and the including file's own keys override all of
//! them. Merging is shallow: a top-level key is replaced as a whole.

use crate::{ConfigError, ConfigResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Key that names base files
pub const INCLUDE_KEY: &str = "include";

/// Load `path` and every file it includes into one mapping
///
/// The returned mapping no longer contains `include` keys.
pub fn load_with_includes<P: AsRef<Path>>(path: P) -> ConfigResult<Mapping> {
    let mut chain = Vec::new();
    load_recursive(path.as_ref(), &mut chain)
}

fn load_recursive(path: &Path, chain: &mut Vec<PathBuf>) -> ConfigResult<Mapping> {
    let canonical = fs::canonicalize(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if chain.contains(&canonical) {
        let mut names: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
        names.push(canonical.display().to_string());
        return Err(ConfigError::CyclicInclude {
            chain: names.join(" -> "),
        });
    }
    chain.push(canonical);

    let mut own = read_document(path)?;
    let includes = take_includes(path, &mut own)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut merged = Mapping::new();
    for include in includes {
        let included = load_recursive(&base_dir.join(include), chain)?;
        merged.extend(included);
    }
    merged.extend(own);

    chain.pop();
    Ok(merged)
}

/// Parse one file into a mapping; an empty document is an empty mapping
fn read_document(path: &Path) -> ConfigResult<Mapping> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        _ => serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
    };

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(parse_error(format!(
            "top level must be a mapping, found {}",
            value_kind(&other)
        ))),
    }
}

/// Remove the `include` key and return the named files in order
fn take_includes(path: &Path, document: &mut Mapping) -> ConfigResult<Vec<String>> {
    let invalid = |message: &str| ConfigError::InvalidInclude {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    match document.remove(INCLUDE_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(single)) => Ok(vec![single]),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                _ => Err(invalid("list entries must be file paths")),
            })
            .collect(),
        Some(_) => Err(invalid("expected a file path or a list of file paths")),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
        mapping.get(Value::String(key.to_string()))
    }

    #[test]
    fn test_without_include_returns_own_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cfg.yaml", "a: 1\nb: 2\n");

        let merged = load_with_includes(&path).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(get(&merged, "a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_own_keys_override_include() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.yaml", "a: 1\nb: 2\n");
        let path = write(&dir, "cfg.yaml", "include: base.yaml\nb: 20\nc: 30\n");

        let merged = load_with_includes(&path).unwrap();
        assert_eq!(get(&merged, "a"), Some(&Value::from(1)));
        assert_eq!(get(&merged, "b"), Some(&Value::from(20)));
        assert_eq!(get(&merged, "c"), Some(&Value::from(30)));
        assert!(get(&merged, INCLUDE_KEY).is_none());
    }

    #[test]
    fn test_later_include_overrides_earlier() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "x: 1\ny: 1\n");
        write(&dir, "b.yaml", "y: 2\nz: 2\n");
        let path = write(&dir, "cfg.yaml", "include: [a.yaml, b.yaml]\nz: 999\n");

        let merged = load_with_includes(&path).unwrap();
        assert_eq!(get(&merged, "x"), Some(&Value::from(1)));
        assert_eq!(get(&merged, "y"), Some(&Value::from(2)));
        assert_eq!(get(&merged, "z"), Some(&Value::from(999)));
    }

    #[test]
    fn test_merge_is_shallow() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.yaml", "logging:\n  console:\n    level: debug\n  file:\n    enabled: false\n");
        let path = write(&dir, "cfg.yaml", "include: base.yaml\nlogging:\n  console:\n    level: warn\n");

        let merged = load_with_includes(&path).unwrap();
        let logging = get(&merged, "logging").and_then(Value::as_mapping).unwrap();
        assert!(get(logging, "file").is_none());
    }

    #[test]
    fn test_nested_includes_resolve_relative_to_includer() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("shared")).unwrap();
        write(&dir, "shared/root.yaml", "a: root\n");
        write(&dir, "shared/site.yaml", "include: root.yaml\nb: site\n");
        let path = write(&dir, "cfg.yaml", "include: shared/site.yaml\n");

        let merged = load_with_includes(&path).unwrap();
        assert_eq!(get(&merged, "a"), Some(&Value::from("root")));
        assert_eq!(get(&merged, "b"), Some(&Value::from("site")));
    }

    #[test]
    fn test_cycle_is_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "include: b.yaml\na: 1\n");
        let b = write(&dir, "b.yaml", "include: a.yaml\nb: 2\n");

        let error = load_with_includes(&b).unwrap_err();
        assert!(matches!(error, ConfigError::CyclicInclude { .. }));
        assert!(error.to_string().contains("Cyclic include"));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let dir = TempDir::new().unwrap();
        write(&dir, "common.yaml", "a: 1\n");
        write(&dir, "left.yaml", "include: common.yaml\n");
        write(&dir, "right.yaml", "include: common.yaml\n");
        let path = write(&dir, "cfg.yaml", "include: [left.yaml, right.yaml]\n");

        assert!(load_with_includes(&path).is_ok());
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.yaml", "a: 1\n  b: 2\n");

        assert!(matches!(
            load_with_includes(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_include_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cfg.yaml", "include: nowhere.yaml\n");

        assert!(matches!(
            load_with_includes(&path),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_toml_include() {
        let dir = TempDir::new().unwrap();
        write(&dir, "base.toml", "ftp_host = \"ftp.example.org\"\nftp_repeat = 5\n");
        let path = write(&dir, "cfg.yaml", "include: base.toml\nftp_repeat: 2\n");

        let merged = load_with_includes(&path).unwrap();
        assert_eq!(get(&merged, "ftp_host"), Some(&Value::from("ftp.example.org")));
        assert_eq!(get(&merged, "ftp_repeat"), Some(&Value::from(2)));
    }

    #[test]
    fn test_include_must_be_paths() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "cfg.yaml", "include: 42\n");

        assert!(matches!(
            load_with_includes(&path),
            Err(ConfigError::InvalidInclude { .. })
        ));
    }
}

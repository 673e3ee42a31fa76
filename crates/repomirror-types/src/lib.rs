//! Core type system and error handling for repomirror
//!
//! This crate provides the foundational types, error handling, and shared data structures
//! used throughout the repomirror workspace. It includes:
//!
//! - **Error handling**: One error taxonomy with kinds, severity levels and context
//! - **Snapshots**: Name-keyed file snapshots and repository snapshots
//! - **Plans and reports**: Diff plans, report items and their severities
//! - **Traits**: The transport, operator-prompt and progress ports
//! - **Component keys**: The `_<digits>` version-suffix rule shared by the planner and validator
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support for the data model
//!
//! # Examples
//!
//! ```rust
//! use repomirror_types::{component_key, FileSnapshot, RepositorySnapshot};
//!
//! let mut snapshot = RepositorySnapshot::new();
//! snapshot.insert(FileSnapshot::new("update_42.zip").with_size(1024));
//!
//! assert!(snapshot.contains("update_42.zip"));
//! assert_eq!(component_key("update_42.zip"), "update.zip");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod component;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use component::component_key;
pub use config::{BlockSize, RetryPolicy};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_collects_items() {
        let mut report = Report::new();
        assert!(report.is_empty());

        report.push(ReportItem::warning("AAA_1.zip", "excluded by stop list"));
        report.push(ReportItem::error("BBB_2.zip", "file not downloaded"));

        assert_eq!(report.len(), 2);
        assert!(report.has_errors());
    }

    #[test]
    fn test_error_severity() {
        let io_error = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));
        assert_eq!(io_error.severity(), ErrorSeverity::High);

        let config_error = Error::config("invalid config");
        assert_eq!(config_error.severity(), ErrorSeverity::Critical);
        assert!(!config_error.is_recoverable());
    }

    #[test]
    fn test_block_size_validation() {
        assert!(BlockSize::new(64 * 1024).is_ok());
        assert!(BlockSize::new(0).is_err());
    }
}

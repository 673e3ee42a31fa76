//! Integration test support for repomirror
//!
//! The helpers in [`test_utils`] drive whole mirror runs without a network:
//! the remote repository is a plain directory and the operator answers from
//! a script.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// A directory-backed remote repository, a scripted operator and fixture
/// builders shared by the integration tests.
pub mod test_utils;

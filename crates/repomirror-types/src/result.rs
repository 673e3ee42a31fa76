//! Result type alias for repomirror operations

use crate::Error;

/// Result type alias for repomirror operations
pub type Result<T> = std::result::Result<T, Error>;

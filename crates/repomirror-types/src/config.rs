//! Configuration types for repomirror
//!
//! This module provides small validated value types shared by the transport
//! and the configuration crate.

use std::time::Duration;

/// Transfer block size with validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockSize(usize);

impl BlockSize {
    /// Minimum block size (1 byte)
    pub const MIN: usize = 1;
    /// Maximum block size (16MB)
    pub const MAX: usize = 16 * 1024 * 1024;
    /// Default block size (64KB)
    pub const DEFAULT: usize = 64 * 1024;

    /// Create a new block size with validation
    pub fn new(size: usize) -> Result<Self, String> {
        if size < Self::MIN {
            Err(format!("Block size {} is below minimum {}", size, Self::MIN))
        } else if size > Self::MAX {
            Err(format!("Block size {} exceeds maximum {}", size, Self::MAX))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the block size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Retry policy for protocol calls
///
/// The delay is fixed: every transient fault is followed by one reconnect and
/// the same pause before the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(attempts: u32, delay: Duration) -> Result<Self, String> {
        if attempts == 0 {
            return Err("Retry attempts must be at least 1".to_string());
        }
        Ok(Self { attempts, delay })
    }

    /// A policy that makes a single attempt with no pause
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Whether another attempt follows `attempt` (1-based)
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt < self.attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_validation() {
        assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
        let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();
        assert!(policy.has_next(1));
        assert!(policy.has_next(2));
        assert!(!policy.has_next(3));
    }

    #[test]
    fn test_single_attempt_policy() {
        let policy = RetryPolicy::once();
        assert!(!policy.has_next(1));
        assert_eq!(policy.delay, Duration::ZERO);
    }

    #[test]
    fn test_block_size_bounds() {
        assert_eq!(BlockSize::default().get(), 64 * 1024);
        assert!(BlockSize::new(BlockSize::MAX + 1).is_err());
        assert_eq!(BlockSize::new(8192).unwrap().get(), 8192);
    }
}

//! Error types for motion-spring crate.

use thiserror::Error;

/// Errors that can occur while blending poses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SpringError {
    /// A pose does not have the bone count the inertializer was created for.
    #[error("pose has {actual} bones, inertializer expects {expected}")]
    BoneCountMismatch {
        /// Bone count of the inertializer.
        expected: usize,
        /// Bone count of the supplied pose.
        actual: usize,
    },
}

impl SpringError {
    /// Creates a bone count mismatch error.
    #[must_use]
    pub const fn bone_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::BoneCountMismatch { expected, actual }
    }
}

/// Result type for spring operations.
pub type Result<T> = std::result::Result<T, SpringError>;

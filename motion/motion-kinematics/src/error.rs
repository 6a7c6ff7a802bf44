//! Error types for the motion-kinematics crate.

use thiserror::Error;

/// Errors that can occur while building a skeleton or evaluating kinematics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KinematicsError {
    /// A bone references a parent that does not precede it.
    #[error("bone {bone} has parent {parent}; parents must precede their children")]
    ParentOrder {
        /// The offending bone.
        bone: usize,
        /// Its parent index.
        parent: usize,
    },

    /// A signed parent index was negative but not the root sentinel.
    #[error("bone {bone} has invalid parent index {parent}")]
    InvalidParent {
        /// The offending bone.
        bone: usize,
        /// The raw parent index.
        parent: i64,
    },

    /// A bone index is outside the skeleton.
    #[error("bone {bone} out of range for skeleton with {count} bones")]
    BoneOutOfRange {
        /// The requested bone.
        bone: usize,
        /// Number of bones in the skeleton.
        count: usize,
    },

    /// A per-bone slice does not match the skeleton's bone count.
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which input was mismatched.
        what: &'static str,
        /// Expected number of entries (bone count).
        expected: usize,
        /// Actual number of entries.
        actual: usize,
    },
}

impl KinematicsError {
    /// Creates a bone out of range error.
    #[must_use]
    pub const fn bone_out_of_range(bone: usize, count: usize) -> Self {
        Self::BoneOutOfRange { bone, count }
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}

/// Result type for kinematics operations.
pub type Result<T> = std::result::Result<T, KinematicsError>;

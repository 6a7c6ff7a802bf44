//! Error types for the motion-matching crate.

use motion_kinematics::KinematicsError;
use thiserror::Error;

/// Errors that can occur while building or searching a feature database.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MatchingError {
    /// A feature block has no variation over the whole database.
    #[error("feature columns {column}..{} have zero variance", column + width)]
    DegenerateFeature {
        /// First column of the block.
        column: usize,
        /// Width of the block.
        width: usize,
    },

    /// A frame index lies in no clip range.
    #[error("frame {frame} is not inside any clip range")]
    FrameOutsideRanges {
        /// The frame index.
        frame: usize,
    },

    /// A query vector has the wrong number of features.
    #[error("query has {actual} features, database expects {expected}")]
    QueryWidthMismatch {
        /// Feature count of the database.
        expected: usize,
        /// Length of the supplied query.
        actual: usize,
    },

    /// Clip ranges are empty, unsorted, overlapping or out of bounds.
    #[error("invalid clip ranges: {0}")]
    InvalidRanges(String),

    /// Raw animation arrays are inconsistent.
    #[error("invalid animation data: {0}")]
    InvalidAnimation(String),

    /// A configuration value is out of its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Skeleton or forward kinematics failure.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

impl MatchingError {
    /// Creates a degenerate feature error.
    #[must_use]
    pub const fn degenerate_feature(column: usize, width: usize) -> Self {
        Self::DegenerateFeature { column, width }
    }

    /// Creates a frame outside ranges error.
    #[must_use]
    pub const fn frame_outside_ranges(frame: usize) -> Self {
        Self::FrameOutsideRanges { frame }
    }

    /// Creates a query width mismatch error.
    #[must_use]
    pub const fn query_width_mismatch(expected: usize, actual: usize) -> Self {
        Self::QueryWidthMismatch { expected, actual }
    }

    /// Creates an invalid ranges error.
    #[must_use]
    pub fn invalid_ranges(reason: impl Into<String>) -> Self {
        Self::InvalidRanges(reason.into())
    }

    /// Creates an invalid animation error.
    #[must_use]
    pub fn invalid_animation(reason: impl Into<String>) -> Self {
        Self::InvalidAnimation(reason.into())
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for motion matching operations.
pub type Result<T> = std::result::Result<T, MatchingError>;

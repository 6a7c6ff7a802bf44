//! Feature layout and extraction.
//!
//! Every frame is described by 27 root-relative values:
//!
//! | columns | group |
//! |---|---|
//! | 0..3 | left foot position |
//! | 3..6 | right foot position |
//! | 6..9 | left foot velocity |
//! | 9..12 | right foot velocity |
//! | 12..15 | hip velocity |
//! | 15..21 | trajectory positions, (x, z) at three future offsets |
//! | 21..27 | trajectory directions, (x, z) at three future offsets |
//!
//! "Root-relative" means translated by the inverse root position and rotated
//! by the inverse root rotation of the same frame. Velocities are only rotated.

use std::ops::Range;

use glam::Vec3;
use motion_kinematics::{LocalMotion, PartialKinematics};
use rayon::prelude::*;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::animation::AnimationData;
use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::normalize::Normalization;
use crate::params::{FeatureConfig, FeatureWeights};

/// Total number of feature columns.
pub const FEATURE_COUNT: usize = 27;

/// Number of trajectory samples.
pub const TRAJECTORY_SAMPLES: usize = 3;

/// A block of feature columns normalized together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureGroup {
    /// Left foot position, 3 wide.
    LeftFootPosition,
    /// Right foot position, 3 wide.
    RightFootPosition,
    /// Left foot velocity, 3 wide.
    LeftFootVelocity,
    /// Right foot velocity, 3 wide.
    RightFootVelocity,
    /// Hip velocity, 3 wide.
    HipVelocity,
    /// Planar future root positions, 6 wide.
    TrajectoryPositions,
    /// Planar future root forward directions, 6 wide.
    TrajectoryDirections,
}

impl FeatureGroup {
    /// All groups in column order.
    pub const ALL: [Self; 7] = [
        Self::LeftFootPosition,
        Self::RightFootPosition,
        Self::LeftFootVelocity,
        Self::RightFootVelocity,
        Self::HipVelocity,
        Self::TrajectoryPositions,
        Self::TrajectoryDirections,
    ];

    /// First column of the group.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::LeftFootPosition => 0,
            Self::RightFootPosition => 3,
            Self::LeftFootVelocity => 6,
            Self::RightFootVelocity => 9,
            Self::HipVelocity => 12,
            Self::TrajectoryPositions => 15,
            Self::TrajectoryDirections => 21,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::TrajectoryPositions | Self::TrajectoryDirections => 2 * TRAJECTORY_SAMPLES,
            _ => 3,
        }
    }

    /// Column range of the group.
    #[must_use]
    pub const fn columns(self) -> Range<usize> {
        self.offset()..self.offset() + self.width()
    }

    /// The weight that applies to this group.
    #[must_use]
    pub const fn weight(self, weights: &FeatureWeights) -> f32 {
        match self {
            Self::LeftFootPosition | Self::RightFootPosition => weights.foot_position,
            Self::LeftFootVelocity | Self::RightFootVelocity => weights.foot_velocity,
            Self::HipVelocity => weights.hip_velocity,
            Self::TrajectoryPositions => weights.trajectory_position,
            Self::TrajectoryDirections => weights.trajectory_direction,
        }
    }
}

pub(crate) fn write_vec3(row: &mut [f32], group: FeatureGroup, v: Vec3) {
    row[group.columns()].copy_from_slice(&v.to_array());
}

pub(crate) fn write_planar(row: &mut [f32], group: FeatureGroup, sample: usize, v: Vec3) {
    let at = group.offset() + 2 * sample;
    row[at] = v.x;
    row[at + 1] = v.z;
}

/// Raw (unnormalized) features of one frame.
///
/// # Errors
///
/// Returns an error if a configured bone is out of range or `frame` lies in
/// no clip range.
pub fn frame_features(
    animation: &AnimationData,
    config: &FeatureConfig,
    frame: usize,
) -> Result<[f32; FEATURE_COUNT]> {
    let mut row = [0.0; FEATURE_COUNT];
    write_frame_features(animation, config, frame, &mut row, &mut None)?;
    Ok(row)
}

/// Per-worker traversal cache, reset for every frame.
type FrameKinematics<'a> = Option<PartialKinematics<'a, LocalMotion<'a>>>;

fn write_frame_features<'a>(
    animation: &'a AnimationData,
    config: &FeatureConfig,
    frame: usize,
    row: &mut [f32],
    cache: &mut FrameKinematics<'a>,
) -> Result<()> {
    let root = animation.root(frame);
    let bones = &config.bones;

    // Feet and hips share the pelvis chain; one traversal serves all three.
    let motion = animation.motion(frame);
    let fk = match cache.take() {
        Some(mut fk) => {
            fk.reset(motion)?;
            cache.insert(fk)
        }
        None => cache.insert(PartialKinematics::new(animation.skeleton(), motion)?),
    };
    let left = fk.bone(bones.left_foot)?;
    let right = fk.bone(bones.right_foot)?;
    let hips = fk.bone(bones.hips)?;

    write_vec3(row, FeatureGroup::LeftFootPosition, root.inverse_transform_point(left.position));
    write_vec3(row, FeatureGroup::RightFootPosition, root.inverse_transform_point(right.position));
    write_vec3(row, FeatureGroup::LeftFootVelocity, root.inverse_transform_vector(left.velocity));
    write_vec3(row, FeatureGroup::RightFootVelocity, root.inverse_transform_vector(right.velocity));
    write_vec3(row, FeatureGroup::HipVelocity, root.inverse_transform_vector(hips.velocity));

    for (sample, &offset) in config.trajectory_offsets.iter().enumerate() {
        let offset = isize::try_from(offset).unwrap_or(isize::MAX);
        let future = animation.root(animation.ranges().clamp_index(frame, offset)?);
        write_planar(
            row,
            FeatureGroup::TrajectoryPositions,
            sample,
            root.inverse_transform_point(future.position),
        );
        write_planar(
            row,
            FeatureGroup::TrajectoryDirections,
            sample,
            root.inverse_transform_vector(future.rotation * Vec3::Z),
        );
    }
    Ok(())
}

/// Extracts and normalizes the feature matrix of every frame.
///
/// Statistics come from frames inside clip ranges only. Frames in the gaps
/// between clips are never searched and stay at zero in the normalized matrix.
///
/// # Errors
///
/// Returns an error for invalid configuration or a degenerate feature group.
pub fn extract_features(
    animation: &AnimationData,
    config: &FeatureConfig,
) -> Result<(FeatureMatrix, Normalization)> {
    config.validate(animation.bone_count())?;

    let horizon = config.horizon();
    for range in animation.ranges() {
        if range.len() <= horizon {
            warn!(
                start = range.start,
                stop = range.stop,
                horizon,
                "Clip shorter than trajectory horizon, future samples will be clamped"
            );
        }
    }

    let in_clip: Vec<bool> = (0..animation.frame_count())
        .map(|frame| animation.ranges().contains(frame))
        .collect();

    let mut features = FeatureMatrix::zeros(animation.frame_count(), FEATURE_COUNT);
    features
        .par_rows_mut()
        .enumerate()
        .filter(|(frame, _)| in_clip[*frame])
        .try_for_each_init(
            || None,
            |cache, (frame, row)| write_frame_features(animation, config, frame, row, cache),
        )?;

    let mut normalization = Normalization::identity(FEATURE_COUNT);
    for group in FeatureGroup::ALL {
        let weight = group.weight(&config.weights);
        let std = normalization.normalize_columns_where(
            &mut features,
            group.columns(),
            weight,
            |frame| in_clip[frame],
        )?;
        debug!(?group, std, scale = std / weight, "Normalized feature group");
    }

    Ok((features, normalization))
}

//! Feature extraction and search parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MatchingError, Result};

/// Per-group importance weights.
///
/// A larger weight shrinks the group's normalization scale, stretching its
/// columns and giving them more influence on the distance.
///
/// # Example
///
/// ```
/// use motion_matching::FeatureWeights;
///
/// let weights = FeatureWeights::default().trajectory_direction(2.0);
/// assert!(weights.validate().is_ok());
/// assert!(FeatureWeights::uniform(0.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureWeights {
    /// Weight of both foot position blocks.
    pub foot_position: f32,
    /// Weight of both foot velocity blocks.
    pub foot_velocity: f32,
    /// Weight of the hip velocity block.
    pub hip_velocity: f32,
    /// Weight of the future trajectory positions.
    pub trajectory_position: f32,
    /// Weight of the future trajectory directions.
    pub trajectory_direction: f32,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            foot_position: 0.75,
            foot_velocity: 1.0,
            hip_velocity: 1.0,
            trajectory_position: 1.0,
            trajectory_direction: 1.5,
        }
    }
}

impl FeatureWeights {
    /// Same weight for every group.
    #[must_use]
    pub const fn uniform(weight: f32) -> Self {
        Self {
            foot_position: weight,
            foot_velocity: weight,
            hip_velocity: weight,
            trajectory_position: weight,
            trajectory_direction: weight,
        }
    }

    /// Favors following the desired trajectory over pose continuity.
    #[must_use]
    pub const fn trajectory_focused() -> Self {
        Self {
            foot_position: 0.5,
            foot_velocity: 0.5,
            hip_velocity: 0.75,
            trajectory_position: 1.5,
            trajectory_direction: 2.0,
        }
    }

    /// Set the foot position weight.
    #[must_use]
    pub const fn foot_position(mut self, weight: f32) -> Self {
        self.foot_position = weight;
        self
    }

    /// Set the foot velocity weight.
    #[must_use]
    pub const fn foot_velocity(mut self, weight: f32) -> Self {
        self.foot_velocity = weight;
        self
    }

    /// Set the hip velocity weight.
    #[must_use]
    pub const fn hip_velocity(mut self, weight: f32) -> Self {
        self.hip_velocity = weight;
        self
    }

    /// Set the trajectory position weight.
    #[must_use]
    pub const fn trajectory_position(mut self, weight: f32) -> Self {
        self.trajectory_position = weight;
        self
    }

    /// Set the trajectory direction weight.
    #[must_use]
    pub const fn trajectory_direction(mut self, weight: f32) -> Self {
        self.trajectory_direction = weight;
        self
    }

    /// Checks that every weight is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] naming the first bad weight.
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("foot_position", self.foot_position),
            ("foot_velocity", self.foot_velocity),
            ("hip_velocity", self.hip_velocity),
            ("trajectory_position", self.trajectory_position),
            ("trajectory_direction", self.trajectory_direction),
        ] {
            check_weight(name, weight)?;
        }
        Ok(())
    }
}

pub(crate) fn check_weight(name: &str, weight: f32) -> Result<()> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(MatchingError::invalid_config(format!(
            "{name} weight must be finite and positive, got {weight}"
        )))
    }
}

/// Skeleton bones sampled by the pose features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureBones {
    /// Left foot bone index.
    pub left_foot: usize,
    /// Right foot bone index.
    pub right_foot: usize,
    /// Hip bone index.
    pub hips: usize,
}

impl Default for FeatureBones {
    /// Entity, hips, then left and right leg chains of four bones each.
    fn default() -> Self {
        Self {
            left_foot: 4,
            right_foot: 8,
            hips: 1,
        }
    }
}

impl FeatureBones {
    /// Creates a bone selection.
    #[must_use]
    pub const fn new(left_foot: usize, right_foot: usize, hips: usize) -> Self {
        Self {
            left_foot,
            right_foot,
            hips,
        }
    }

    /// Checks every bone against `bone_count`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] for an out-of-range bone.
    pub fn validate(&self, bone_count: usize) -> Result<()> {
        for (name, bone) in [
            ("left_foot", self.left_foot),
            ("right_foot", self.right_foot),
            ("hips", self.hips),
        ] {
            if bone >= bone_count {
                return Err(MatchingError::invalid_config(format!(
                    "{name} bone {bone} out of range for {bone_count} bones"
                )));
            }
        }
        Ok(())
    }
}

/// Everything needed to turn animation into a feature matrix.
///
/// # Example
///
/// ```
/// use motion_matching::{FeatureBones, FeatureConfig};
///
/// let config = FeatureConfig::default()
///     .bones(FeatureBones::new(3, 6, 1))
///     .trajectory_offsets([10, 20, 30]);
/// assert_eq!(config.trajectory_offsets, [10, 20, 30]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureConfig {
    /// Group weights.
    pub weights: FeatureWeights,
    /// Sampled bones.
    pub bones: FeatureBones,
    /// Future frame offsets of the trajectory samples.
    pub trajectory_offsets: [usize; 3],
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            bones: FeatureBones::default(),
            trajectory_offsets: [20, 40, 60], // 1/3s, 2/3s, 1s at 60Hz
        }
    }
}

impl FeatureConfig {
    /// Set the weights.
    #[must_use]
    pub const fn weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the sampled bones.
    #[must_use]
    pub const fn bones(mut self, bones: FeatureBones) -> Self {
        self.bones = bones;
        self
    }

    /// Set the trajectory offsets.
    #[must_use]
    pub const fn trajectory_offsets(mut self, offsets: [usize; 3]) -> Self {
        self.trajectory_offsets = offsets;
        self
    }

    /// Longest trajectory offset.
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.trajectory_offsets.iter().copied().max().unwrap_or(0)
    }

    /// Validates weights, bones and offsets.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] on the first invalid field.
    pub fn validate(&self, bone_count: usize) -> Result<()> {
        self.weights.validate()?;
        self.bones.validate(bone_count)?;
        if let Some(&offset) = self
            .trajectory_offsets
            .iter()
            .find(|&&o| isize::try_from(o).is_err())
        {
            return Err(MatchingError::invalid_config(format!(
                "trajectory offset {offset} too large"
            )));
        }
        Ok(())
    }
}

/// Search-time parameters.
///
/// # Example
///
/// ```
/// use motion_matching::SearchParams;
///
/// let params = SearchParams::default().transition_cost(0.1);
/// assert_eq!(params.ignore_range_end, 20);
/// assert_eq!(params.ignore_surrounding, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchParams {
    /// Penalty added to every candidate except the current frame.
    pub transition_cost: f32,
    /// Frames at the end of each clip that are never returned.
    pub ignore_range_end: usize,
    /// Candidates closer than this to the current frame are skipped.
    pub ignore_surrounding: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            transition_cost: 0.0,
            ignore_range_end: 20,
            ignore_surrounding: 20,
        }
    }
}

impl SearchParams {
    /// No exclusions and no penalty: a plain nearest neighbor query.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            transition_cost: 0.0,
            ignore_range_end: 0,
            ignore_surrounding: 0,
        }
    }

    /// Set the transition cost.
    #[must_use]
    pub const fn transition_cost(mut self, cost: f32) -> Self {
        self.transition_cost = cost;
        self
    }

    /// Set the clip tail exclusion.
    #[must_use]
    pub const fn ignore_range_end(mut self, frames: usize) -> Self {
        self.ignore_range_end = frames;
        self
    }

    /// Set the exclusion window around the current frame.
    #[must_use]
    pub const fn ignore_surrounding(mut self, frames: usize) -> Self {
        self.ignore_surrounding = frames;
        self
    }
}

//! Raw query assembly.

use glam::Vec3;
use motion_kinematics::BoneTransform;

use crate::database::FeatureDatabase;
use crate::error::Result;
use crate::features::{FEATURE_COUNT, FeatureGroup, TRAJECTORY_SAMPLES, write_planar, write_vec3};

/// A raw (unnormalized) query vector in feature layout order.
///
/// Typical use starts from the current frame, keeping its pose features,
/// and overwrites the trajectory with the desired future.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use motion_matching::{FeatureGroup, FeatureQuery};
///
/// let query = FeatureQuery::new()
///     .hip_velocity(Vec3::new(0.0, 0.0, 1.5))
///     .trajectory_positions([Vec3::Z, Vec3::Z * 2.0, Vec3::Z * 3.0]);
///
/// assert_eq!(query.group(FeatureGroup::HipVelocity), &[0.0, 0.0, 1.5]);
/// assert_eq!(query.group(FeatureGroup::TrajectoryPositions), &[0.0, 1.0, 0.0, 2.0, 0.0, 3.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureQuery {
    values: [f32; FEATURE_COUNT],
}

impl Default for FeatureQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureQuery {
    /// An all-zero query.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Starts from the raw features of a database frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `frame` lies in no clip range.
    pub fn from_frame(db: &FeatureDatabase, frame: usize) -> Result<Self> {
        let mut query = Self::new();
        query.values.copy_from_slice(&db.denormalized_features(frame)?);
        Ok(query)
    }

    /// Root-relative foot positions.
    #[must_use]
    pub fn foot_positions(mut self, left: Vec3, right: Vec3) -> Self {
        write_vec3(&mut self.values, FeatureGroup::LeftFootPosition, left);
        write_vec3(&mut self.values, FeatureGroup::RightFootPosition, right);
        self
    }

    /// Root-relative foot velocities.
    #[must_use]
    pub fn foot_velocities(mut self, left: Vec3, right: Vec3) -> Self {
        write_vec3(&mut self.values, FeatureGroup::LeftFootVelocity, left);
        write_vec3(&mut self.values, FeatureGroup::RightFootVelocity, right);
        self
    }

    /// Root-relative hip velocity.
    #[must_use]
    pub fn hip_velocity(mut self, velocity: Vec3) -> Self {
        write_vec3(&mut self.values, FeatureGroup::HipVelocity, velocity);
        self
    }

    /// Root-relative future positions; only x and z are used.
    #[must_use]
    pub fn trajectory_positions(mut self, positions: [Vec3; TRAJECTORY_SAMPLES]) -> Self {
        for (i, p) in positions.into_iter().enumerate() {
            write_planar(&mut self.values, FeatureGroup::TrajectoryPositions, i, p);
        }
        self
    }

    /// Root-relative future forward directions; only x and z are used.
    #[must_use]
    pub fn trajectory_directions(mut self, directions: [Vec3; TRAJECTORY_SAMPLES]) -> Self {
        for (i, d) in directions.into_iter().enumerate() {
            write_planar(&mut self.values, FeatureGroup::TrajectoryDirections, i, d);
        }
        self
    }

    /// World-space future positions and directions, expressed relative to `root`.
    #[must_use]
    pub fn world_trajectory(
        self,
        root: &BoneTransform,
        positions: [Vec3; TRAJECTORY_SAMPLES],
        directions: [Vec3; TRAJECTORY_SAMPLES],
    ) -> Self {
        self.trajectory_positions(positions.map(|p| root.inverse_transform_point(p)))
            .trajectory_directions(directions.map(|d| root.inverse_transform_vector(d)))
    }

    /// Values of one group.
    #[must_use]
    pub fn group(&self, group: FeatureGroup) -> &[f32] {
        &self.values[group.columns()]
    }

    /// All values in layout order.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

impl AsRef<[f32]> for FeatureQuery {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

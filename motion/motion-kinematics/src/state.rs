//! Bone transforms, bone states and the local-space inputs they are built from.

use glam::{Quat, Vec3};

use crate::error::{KinematicsError, Result};
use crate::skeleton::Skeleton;

/// Position and rotation of a bone.
///
/// # Example
///
/// ```
/// use motion_kinematics::BoneTransform;
/// use glam::{Quat, Vec3};
///
/// let parent = BoneTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
/// let child = parent.compose(&BoneTransform::from_position(Vec3::Y));
/// assert!((child.position - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneTransform {
    /// Position.
    pub position: Vec3,
    /// Rotation.
    pub rotation: Quat,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BoneTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a transform from position and rotation.
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Creates a translation-only transform.
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Expresses a child's local transform in this transform's space.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            position: self.rotation * local.position + self.position,
            rotation: self.rotation * local.rotation,
        }
    }

    /// Maps a point in the same space as this transform into its local space.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Maps a direction into this transform's local space.
    #[must_use]
    pub fn inverse_transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector
    }
}

/// Position, linear velocity, rotation and angular velocity of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneState {
    /// Position.
    pub position: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Angular velocity (axis times radians per second).
    pub angular_velocity: Vec3,
}

impl Default for BoneState {
    fn default() -> Self {
        Self::REST
    }
}

impl BoneState {
    /// Identity transform at rest.
    pub const REST: Self = Self {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        angular_velocity: Vec3::ZERO,
    };

    /// Position and rotation only.
    #[must_use]
    pub const fn transform(&self) -> BoneTransform {
        BoneTransform::new(self.position, self.rotation)
    }

    /// Expresses a child's local state in this state's space.
    ///
    /// The child velocity has three parts: the velocity inherited from this
    /// bone, the child's own local velocity rotated into this space, and the
    /// tangential velocity `ω × r` induced by this bone's rotation.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        let offset = self.rotation * local.position;
        Self {
            position: offset + self.position,
            velocity: self.velocity
                + self.rotation * local.velocity
                + self.angular_velocity.cross(offset),
            rotation: self.rotation * local.rotation,
            angular_velocity: self.rotation * (local.angular_velocity + self.angular_velocity),
        }
    }
}

/// Local-space inputs that can be composed down a parent chain.
///
/// Implemented by [`LocalPose`] (transforms only) and [`LocalMotion`]
/// (transforms and velocities), so every traversal mode works for both.
pub trait KinematicSource {
    /// Global value produced for each bone.
    type Global: Copy + std::fmt::Debug;

    /// Checks the per-bone inputs against the skeleton.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::LengthMismatch`] when a slice length differs
    /// from the bone count.
    fn validate(&self, skeleton: &Skeleton) -> Result<()>;

    /// Value of `bone` when it has no parent.
    fn root(&self, bone: usize) -> Self::Global;

    /// Value of `bone` given its parent's global value.
    fn child(&self, parent: &Self::Global, bone: usize) -> Self::Global;
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(KinematicsError::length_mismatch(what, expected, actual))
    }
}

/// Local positions and rotations of every bone for one frame.
#[derive(Debug, Clone, Copy)]
pub struct LocalPose<'a> {
    /// Parent-relative positions.
    pub positions: &'a [Vec3],
    /// Parent-relative rotations.
    pub rotations: &'a [Quat],
}

impl<'a> LocalPose<'a> {
    /// Creates a pose view.
    #[must_use]
    pub const fn new(positions: &'a [Vec3], rotations: &'a [Quat]) -> Self {
        Self {
            positions,
            rotations,
        }
    }

    fn local(&self, bone: usize) -> BoneTransform {
        BoneTransform::new(self.positions[bone], self.rotations[bone])
    }
}

impl KinematicSource for LocalPose<'_> {
    type Global = BoneTransform;

    fn validate(&self, skeleton: &Skeleton) -> Result<()> {
        let n = skeleton.bone_count();
        check_len("positions", n, self.positions.len())?;
        check_len("rotations", n, self.rotations.len())
    }

    fn root(&self, bone: usize) -> BoneTransform {
        self.local(bone)
    }

    fn child(&self, parent: &BoneTransform, bone: usize) -> BoneTransform {
        parent.compose(&self.local(bone))
    }
}

/// Local positions, velocities, rotations and angular velocities of every
/// bone for one frame.
#[derive(Debug, Clone, Copy)]
pub struct LocalMotion<'a> {
    /// Parent-relative positions.
    pub positions: &'a [Vec3],
    /// Parent-relative linear velocities.
    pub velocities: &'a [Vec3],
    /// Parent-relative rotations.
    pub rotations: &'a [Quat],
    /// Parent-relative angular velocities.
    pub angular_velocities: &'a [Vec3],
}

impl<'a> LocalMotion<'a> {
    /// Creates a motion view.
    #[must_use]
    pub const fn new(
        positions: &'a [Vec3],
        velocities: &'a [Vec3],
        rotations: &'a [Quat],
        angular_velocities: &'a [Vec3],
    ) -> Self {
        Self {
            positions,
            velocities,
            rotations,
            angular_velocities,
        }
    }

    /// The pose part of this motion.
    #[must_use]
    pub const fn pose(&self) -> LocalPose<'a> {
        LocalPose::new(self.positions, self.rotations)
    }

    fn local(&self, bone: usize) -> BoneState {
        BoneState {
            position: self.positions[bone],
            velocity: self.velocities[bone],
            rotation: self.rotations[bone],
            angular_velocity: self.angular_velocities[bone],
        }
    }
}

impl KinematicSource for LocalMotion<'_> {
    type Global = BoneState;

    fn validate(&self, skeleton: &Skeleton) -> Result<()> {
        let n = skeleton.bone_count();
        check_len("positions", n, self.positions.len())?;
        check_len("velocities", n, self.velocities.len())?;
        check_len("rotations", n, self.rotations.len())?;
        check_len("angular velocities", n, self.angular_velocities.len())
    }

    fn root(&self, bone: usize) -> BoneState {
        self.local(bone)
    }

    fn child(&self, parent: &BoneState, bone: usize) -> BoneState {
        parent.compose(&self.local(bone))
    }
}

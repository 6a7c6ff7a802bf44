//! Frame-major animation storage.

use glam::{Quat, Vec3};
use motion_kinematics::{BoneTransform, LocalMotion, LocalPose, Skeleton};

use crate::error::{MatchingError, Result};
use crate::range::ClipRanges;

/// Raw animation arrays as produced by an offline exporter.
///
/// Per-bone arrays are frame-major: the value of bone `b` at frame `f` lives
/// at index `f * bone_parents.len() + b`. Contact flags follow the same
/// layout with `contact_count` flags per frame.
#[derive(Debug, Clone, Default)]
pub struct RawAnimation {
    /// Local bone positions.
    pub bone_positions: Vec<Vec3>,
    /// Local bone linear velocities.
    pub bone_velocities: Vec<Vec3>,
    /// Local bone rotations.
    pub bone_rotations: Vec<Quat>,
    /// Local bone angular velocities.
    pub bone_angular_velocities: Vec<Vec3>,
    /// Parent index of each bone, `-1` for roots.
    pub bone_parents: Vec<i32>,
    /// First frame of each clip.
    pub range_starts: Vec<usize>,
    /// One past the last frame of each clip.
    pub range_stops: Vec<usize>,
    /// Number of contact flags per frame.
    pub contact_count: usize,
    /// Per-frame contact flags, empty when `contact_count` is zero.
    pub contact_states: Vec<bool>,
}

/// Validated animation data: a skeleton, per-frame local bone motion and
/// the clip ranges splitting the frames.
///
/// Bone 0 is the simulation root. Its local transform is the character's
/// world placement and every feature is expressed relative to it.
#[derive(Debug, Clone)]
pub struct AnimationData {
    skeleton: Skeleton,
    frame_count: usize,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    rotations: Vec<Quat>,
    angular_velocities: Vec<Vec3>,
    ranges: ClipRanges,
    contact_count: usize,
    contacts: Vec<bool>,
}

impl AnimationData {
    /// Validates and assembles animation data.
    ///
    /// # Errors
    ///
    /// Returns an error if the skeleton is empty, bone 0 is not a root, the
    /// per-bone arrays disagree in length or are not a whole number of frames,
    /// or the ranges do not fit the frame count.
    pub fn new(
        skeleton: Skeleton,
        positions: Vec<Vec3>,
        velocities: Vec<Vec3>,
        rotations: Vec<Quat>,
        angular_velocities: Vec<Vec3>,
        ranges: ClipRanges,
    ) -> Result<Self> {
        let bones = skeleton.bone_count();
        if bones == 0 {
            return Err(MatchingError::invalid_animation("skeleton has no bones"));
        }
        if !skeleton.is_root(0) {
            return Err(MatchingError::invalid_animation("bone 0 must be the root"));
        }
        if positions.len() % bones != 0 {
            return Err(MatchingError::invalid_animation(format!(
                "{} positions is not a whole number of {bones}-bone frames",
                positions.len()
            )));
        }
        let frame_count = positions.len() / bones;
        if frame_count == 0 {
            return Err(MatchingError::invalid_animation("animation has no frames"));
        }
        for (what, len) in [
            ("velocities", velocities.len()),
            ("rotations", rotations.len()),
            ("angular velocities", angular_velocities.len()),
        ] {
            if len != positions.len() {
                return Err(MatchingError::invalid_animation(format!(
                    "{len} {what} but {} positions",
                    positions.len()
                )));
            }
        }
        if ranges.frame_count() != frame_count {
            return Err(MatchingError::invalid_ranges(format!(
                "ranges cover {} frames but animation has {frame_count}",
                ranges.frame_count()
            )));
        }

        Ok(Self {
            skeleton,
            frame_count,
            positions,
            velocities,
            rotations,
            angular_velocities,
            ranges,
            contact_count: 0,
            contacts: Vec::new(),
        })
    }

    /// Attaches per-frame contact flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `contacts` does not hold `contact_count` flags per frame.
    pub fn with_contacts(mut self, contact_count: usize, contacts: Vec<bool>) -> Result<Self> {
        if contacts.len() != contact_count * self.frame_count {
            return Err(MatchingError::invalid_animation(format!(
                "{} contact flags, expected {contact_count} for each of {} frames",
                contacts.len(),
                self.frame_count
            )));
        }
        self.contact_count = contact_count;
        self.contacts = contacts;
        Ok(self)
    }

    /// Number of frames.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of bones per frame.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.skeleton.bone_count()
    }

    /// The skeleton.
    #[must_use]
    pub const fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// The clip ranges.
    #[must_use]
    pub const fn ranges(&self) -> &ClipRanges {
        &self.ranges
    }

    /// Number of contact flags per frame.
    #[must_use]
    pub const fn contact_count(&self) -> usize {
        self.contact_count
    }

    fn span(&self, frame: usize) -> std::ops::Range<usize> {
        let bones = self.bone_count();
        frame * bones..(frame + 1) * bones
    }

    /// Local motion of every bone at `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is out of range.
    #[must_use]
    pub fn motion(&self, frame: usize) -> LocalMotion<'_> {
        let span = self.span(frame);
        LocalMotion::new(
            &self.positions[span.clone()],
            &self.velocities[span.clone()],
            &self.rotations[span.clone()],
            &self.angular_velocities[span],
        )
    }

    /// Local pose of every bone at `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is out of range.
    #[must_use]
    pub fn pose(&self, frame: usize) -> LocalPose<'_> {
        self.motion(frame).pose()
    }

    /// Simulation root transform at `frame`.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is out of range.
    #[must_use]
    pub fn root(&self, frame: usize) -> BoneTransform {
        let i = frame * self.bone_count();
        BoneTransform::new(self.positions[i], self.rotations[i])
    }

    /// Contact flags at `frame`, empty when no contacts are attached.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is out of range.
    #[must_use]
    pub fn contacts(&self, frame: usize) -> &[bool] {
        &self.contacts[frame * self.contact_count..(frame + 1) * self.contact_count]
    }
}

impl TryFrom<RawAnimation> for AnimationData {
    type Error = MatchingError;

    fn try_from(raw: RawAnimation) -> Result<Self> {
        let skeleton = Skeleton::from_parent_indices(&raw.bone_parents)?;
        let bones = skeleton.bone_count().max(1);
        let ranges = ClipRanges::from_bounds(
            &raw.range_starts,
            &raw.range_stops,
            raw.bone_positions.len() / bones,
        )?;
        Self::new(
            skeleton,
            raw.bone_positions,
            raw.bone_velocities,
            raw.bone_rotations,
            raw.bone_angular_velocities,
            ranges,
        )?
        .with_contacts(raw.contact_count, raw.contact_states)
    }
}

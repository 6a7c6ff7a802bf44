//! Inertialization: hiding target discontinuities behind a decaying offset.
//!
//! When the target a character follows jumps (for example when motion
//! matching switches to a different database frame), the jump is absorbed
//! into an offset so the visible output stays continuous. The offset then
//! decays to zero with a critically damped spring and the output converges on
//! the new target.
//!
//! ```text
//! visible = target + offset        (vectors)
//! visible = offset * target        (rotations)
//! ```

use glam::{Quat, Vec3};
use motion_kinematics::LocalMotion;

use crate::error::{Result, SpringError};
use crate::params::InertializeParams;
use crate::spring::{Spring, decay_spring_damper};

/// Recomputes an offset so the visible value does not change when the target
/// jumps from `src` to `dst`.
///
/// Afterwards `dst + offset` equals the previous `src + offset` (or the
/// rotational equivalent) up to rounding.
pub fn inertialize_transition<T: Spring>(
    offset: &mut T,
    offset_velocity: &mut T::Velocity,
    src: T,
    src_velocity: T::Velocity,
    dst: T,
    dst_velocity: T::Velocity,
) {
    *offset = T::transition_offset(*offset, src, dst);
    *offset_velocity = (src_velocity + *offset_velocity) - dst_velocity;
}

/// Decays the offset by `dt` and returns the visible value and velocity for
/// the current `input` target.
pub fn inertialize_update<T: Spring>(
    offset: &mut T,
    offset_velocity: &mut T::Velocity,
    input: T,
    input_velocity: T::Velocity,
    halflife: f32,
    dt: f32,
) -> (T, T::Velocity) {
    decay_spring_damper(offset, offset_velocity, halflife, dt);
    (T::apply_offset(*offset, input), input_velocity + *offset_velocity)
}

/// Whether an inertializer is carrying an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InertializeState {
    /// No offset has been introduced since creation or the last reset.
    #[default]
    Settled,
    /// A transition introduced an offset that is decaying toward zero.
    Decaying,
}

/// Offset state for one blended value.
///
/// # Example
///
/// ```
/// use motion_spring::{InertializeState, Inertializer};
/// use glam::Vec3;
///
/// let mut blend = Inertializer::<Vec3>::new();
/// let (a, va) = (Vec3::ZERO, Vec3::ZERO);
/// let (b, vb) = (Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
///
/// blend.transition(a, va, b, vb);
/// assert_eq!(blend.state(), InertializeState::Decaying);
///
/// // Still showing the old value right after the jump
/// let (x, _) = blend.update(b, vb, 0.1, 0.0);
/// assert!(x.length() < 1e-6);
///
/// // Converged on the new target later
/// for _ in 0..120 {
///     blend.update(b, vb, 0.1, 1.0 / 60.0);
/// }
/// let (x, _) = blend.update(b, vb, 0.1, 0.0);
/// assert!((x - b).length() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Inertializer<T: Spring> {
    offset: T,
    offset_velocity: T::Velocity,
    state: InertializeState,
}

impl<T: Spring> Default for Inertializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Spring> Inertializer<T> {
    /// Creates a settled inertializer with no offset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            offset: T::REST,
            offset_velocity: T::ZERO_VELOCITY,
            state: InertializeState::Settled,
        }
    }

    /// Absorbs a target jump from `src` to `dst` into the offset.
    pub fn transition(
        &mut self,
        src: T,
        src_velocity: T::Velocity,
        dst: T,
        dst_velocity: T::Velocity,
    ) {
        inertialize_transition(
            &mut self.offset,
            &mut self.offset_velocity,
            src,
            src_velocity,
            dst,
            dst_velocity,
        );
        self.state = InertializeState::Decaying;
    }

    /// Advances the offset decay and returns the visible value and velocity.
    ///
    /// A half-life near zero makes the offset vanish within one step.
    pub fn update(
        &mut self,
        input: T,
        input_velocity: T::Velocity,
        halflife: f32,
        dt: f32,
    ) -> (T, T::Velocity) {
        inertialize_update(
            &mut self.offset,
            &mut self.offset_velocity,
            input,
            input_velocity,
            halflife,
            dt,
        )
    }

    /// Current offset.
    #[must_use]
    pub const fn offset(&self) -> T {
        self.offset
    }

    /// Current offset velocity.
    #[must_use]
    pub const fn offset_velocity(&self) -> T::Velocity {
        self.offset_velocity
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> InertializeState {
        self.state
    }

    /// Returns true if both the offset and its velocity are below `tolerance`.
    #[must_use]
    pub fn is_settled(&self, tolerance: f32) -> bool {
        T::velocity_length(self.offset.displacement(T::REST)) <= tolerance
            && T::velocity_length(self.offset_velocity) <= tolerance
    }

    /// Drops any offset immediately.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Per-bone inertialization of a whole skeleton pose.
///
/// Owned by one character; every bone position and rotation carries its own
/// offset. Feed it the raw database pose each step and read the blended pose
/// back from [`PoseInertializer::output`].
#[derive(Debug, Clone)]
pub struct PoseInertializer {
    params: InertializeParams,
    positions: Vec<Inertializer<Vec3>>,
    rotations: Vec<Inertializer<Quat>>,
    out_positions: Vec<Vec3>,
    out_velocities: Vec<Vec3>,
    out_rotations: Vec<Quat>,
    out_angular_velocities: Vec<Vec3>,
}

impl PoseInertializer {
    /// Creates a settled inertializer for `bone_count` bones in the rest pose.
    #[must_use]
    pub fn new(bone_count: usize, params: InertializeParams) -> Self {
        Self {
            params,
            positions: vec![Inertializer::new(); bone_count],
            rotations: vec![Inertializer::new(); bone_count],
            out_positions: vec![Vec3::ZERO; bone_count],
            out_velocities: vec![Vec3::ZERO; bone_count],
            out_rotations: vec![Quat::IDENTITY; bone_count],
            out_angular_velocities: vec![Vec3::ZERO; bone_count],
        }
    }

    /// Creates a settled inertializer whose output starts at `pose`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pose slices have different lengths.
    pub fn from_pose(pose: &LocalMotion<'_>, params: InertializeParams) -> Result<Self> {
        let mut blend = Self::new(pose.positions.len(), params);
        blend.check(pose)?;
        blend.out_positions.copy_from_slice(pose.positions);
        blend.out_velocities.copy_from_slice(pose.velocities);
        blend.out_rotations.copy_from_slice(pose.rotations);
        blend.out_angular_velocities.copy_from_slice(pose.angular_velocities);
        Ok(blend)
    }

    /// Number of bones.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.positions.len()
    }

    /// Blending parameters.
    #[must_use]
    pub const fn params(&self) -> &InertializeParams {
        &self.params
    }

    /// Absorbs a jump from the `src` pose to the `dst` pose.
    ///
    /// # Errors
    ///
    /// Returns an error if either pose has the wrong bone count.
    pub fn transition(&mut self, src: &LocalMotion<'_>, dst: &LocalMotion<'_>) -> Result<()> {
        self.check(src)?;
        self.check(dst)?;
        for (bone, blend) in self.positions.iter_mut().enumerate() {
            blend.transition(
                src.positions[bone],
                src.velocities[bone],
                dst.positions[bone],
                dst.velocities[bone],
            );
        }
        for (bone, blend) in self.rotations.iter_mut().enumerate() {
            blend.transition(
                src.rotations[bone],
                src.angular_velocities[bone],
                dst.rotations[bone],
                dst.angular_velocities[bone],
            );
        }
        Ok(())
    }

    /// Decays every offset by `dt` and blends them onto `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pose has the wrong bone count.
    pub fn update(&mut self, input: &LocalMotion<'_>, dt: f32) -> Result<()> {
        self.check(input)?;
        let halflife = self.params.halflife;
        for (bone, blend) in self.positions.iter_mut().enumerate() {
            let (x, v) =
                blend.update(input.positions[bone], input.velocities[bone], halflife, dt);
            self.out_positions[bone] = x;
            self.out_velocities[bone] = v;
        }
        for (bone, blend) in self.rotations.iter_mut().enumerate() {
            let (q, w) = blend.update(
                input.rotations[bone],
                input.angular_velocities[bone],
                halflife,
                dt,
            );
            self.out_rotations[bone] = q;
            self.out_angular_velocities[bone] = w;
        }
        Ok(())
    }

    /// The blended pose from the last update.
    #[must_use]
    pub fn output(&self) -> LocalMotion<'_> {
        LocalMotion::new(
            &self.out_positions,
            &self.out_velocities,
            &self.out_rotations,
            &self.out_angular_velocities,
        )
    }

    /// Returns true if every bone offset is within the settle tolerance.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        let tolerance = self.params.settle_tolerance;
        self.positions.iter().all(|b| b.is_settled(tolerance))
            && self.rotations.iter().all(|b| b.is_settled(tolerance))
    }

    /// Drops every offset immediately.
    pub fn reset(&mut self) {
        self.positions.iter_mut().for_each(Inertializer::reset);
        self.rotations.iter_mut().for_each(Inertializer::reset);
    }

    fn check(&self, pose: &LocalMotion<'_>) -> Result<()> {
        let expected = self.bone_count();
        for actual in [
            pose.positions.len(),
            pose.velocities.len(),
            pose.rotations.len(),
            pose.angular_velocities.len(),
        ] {
            if actual != expected {
                return Err(SpringError::bone_count_mismatch(expected, actual));
            }
        }
        Ok(())
    }
}

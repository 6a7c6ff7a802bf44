//! Critically damped spring-damper updates.
//!
//! Both updates are closed form: they evaluate the exact solution of a
//! critically damped second-order system after `dt`, so they are stable for
//! any step size and two half steps equal one full step.
//!
//! The same math drives scalars, vectors and rotations through the [`Spring`]
//! trait. Rotations are handled in scaled angle-axis space relative to the
//! goal, with angular velocity as the velocity type.

use std::ops::{Add, Mul, Sub};

use glam::{Quat, Vec3};

use crate::damper::halflife_to_damping;
use crate::rotation::{from_scaled_angle_axis, quat_abs, to_scaled_angle_axis};

/// A value that can be driven by a spring-damper.
pub trait Spring: Copy + std::fmt::Debug {
    /// Rate of change of the value.
    type Velocity: Copy
        + std::fmt::Debug
        + PartialEq
        + Add<Output = Self::Velocity>
        + Sub<Output = Self::Velocity>
        + Mul<f32, Output = Self::Velocity>;

    /// The neutral value: zero, or the identity rotation.
    const REST: Self;

    /// The zero velocity.
    const ZERO_VELOCITY: Self::Velocity;

    /// Interpolates toward `goal` by `t` in `[0, 1]`.
    #[must_use]
    fn interpolate(self, goal: Self, t: f32) -> Self;

    /// Displacement of `self` from `goal`, in velocity space.
    fn displacement(self, goal: Self) -> Self::Velocity;

    /// Applies a displacement to `goal`. Inverse of [`Spring::displacement`].
    fn displace(goal: Self, displacement: Self::Velocity) -> Self;

    /// Offset that keeps `src + offset` visible after the target jumps to `dst`.
    fn transition_offset(offset: Self, src: Self, dst: Self) -> Self;

    /// Adds an offset to an input value.
    fn apply_offset(offset: Self, input: Self) -> Self;

    /// Magnitude of a velocity-space quantity.
    fn velocity_length(velocity: Self::Velocity) -> f32;
}

impl Spring for f32 {
    type Velocity = f32;
    const REST: Self = 0.0;
    const ZERO_VELOCITY: f32 = 0.0;

    fn interpolate(self, goal: Self, t: f32) -> Self {
        self + (goal - self) * t
    }

    fn displacement(self, goal: Self) -> f32 {
        self - goal
    }

    fn displace(goal: Self, displacement: f32) -> Self {
        displacement + goal
    }

    fn transition_offset(offset: Self, src: Self, dst: Self) -> Self {
        (src + offset) - dst
    }

    fn apply_offset(offset: Self, input: Self) -> Self {
        input + offset
    }

    fn velocity_length(velocity: f32) -> f32 {
        velocity.abs()
    }
}

impl Spring for Vec3 {
    type Velocity = Vec3;
    const REST: Self = Vec3::ZERO;
    const ZERO_VELOCITY: Vec3 = Vec3::ZERO;

    fn interpolate(self, goal: Self, t: f32) -> Self {
        self.lerp(goal, t)
    }

    fn displacement(self, goal: Self) -> Vec3 {
        self - goal
    }

    fn displace(goal: Self, displacement: Vec3) -> Self {
        displacement + goal
    }

    fn transition_offset(offset: Self, src: Self, dst: Self) -> Self {
        (src + offset) - dst
    }

    fn apply_offset(offset: Self, input: Self) -> Self {
        input + offset
    }

    fn velocity_length(velocity: Vec3) -> f32 {
        velocity.length()
    }
}

impl Spring for Quat {
    type Velocity = Vec3;
    const REST: Self = Quat::IDENTITY;
    const ZERO_VELOCITY: Vec3 = Vec3::ZERO;

    fn interpolate(self, goal: Self, t: f32) -> Self {
        // glam's slerp already takes the shortest path
        self.slerp(goal, t)
    }

    fn displacement(self, goal: Self) -> Vec3 {
        to_scaled_angle_axis(quat_abs(self * goal.inverse()))
    }

    fn displace(goal: Self, displacement: Vec3) -> Self {
        from_scaled_angle_axis(displacement) * goal
    }

    fn transition_offset(offset: Self, src: Self, dst: Self) -> Self {
        quat_abs(offset * src * dst.inverse())
    }

    fn apply_offset(offset: Self, input: Self) -> Self {
        offset * input
    }

    fn velocity_length(velocity: Vec3) -> f32 {
        velocity.length()
    }
}

/// Drives `x` and `v` toward `goal` with critical damping.
///
/// # Example
///
/// ```
/// use motion_spring::simple_spring_damper;
///
/// let mut x = 0.0_f32;
/// let mut v = 0.0_f32;
/// for _ in 0..200 {
///     simple_spring_damper(&mut x, &mut v, 1.0, 0.1, 1.0 / 60.0);
/// }
/// assert!((x - 1.0).abs() < 1e-3);
/// ```
pub fn simple_spring_damper<T: Spring>(
    x: &mut T,
    v: &mut T::Velocity,
    goal: T,
    halflife: f32,
    dt: f32,
) {
    let y = halflife_to_damping(halflife) / 2.0;
    let j0 = x.displacement(goal);
    let j1 = *v + j0 * y;
    let eydt = (-y * dt).exp();

    *x = T::displace(goal, (j0 + j1 * dt) * eydt);
    *v = (*v - j1 * (y * dt)) * eydt;
}

/// Decays `x` and `v` toward rest with critical damping.
///
/// Used to fade out an offset rather than to reach a target.
pub fn decay_spring_damper<T: Spring>(x: &mut T, v: &mut T::Velocity, halflife: f32, dt: f32) {
    let y = halflife_to_damping(halflife) / 2.0;
    let j0 = x.displacement(T::REST);
    let j1 = *v + j0 * y;
    let eydt = (-y * dt).exp();

    *x = T::displace(T::REST, (j0 + j1 * dt) * eydt);
    *v = (*v - j1 * (y * dt)) * eydt;
}

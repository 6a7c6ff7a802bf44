//! Half-life based damping conversions and exponential dampers.
//!
//! Every damper and spring in this crate is parameterized by a half-life: the
//! time it takes for the remaining error to halve. A small epsilon is added to
//! the half-life before dividing, so a half-life of zero does not divide by
//! zero; it produces a very large damping and the value snaps to its goal
//! within a single step.

use std::f32::consts::{LN_2, PI};

use crate::spring::Spring;

/// Epsilon added to half-lives and damping values before dividing.
pub const HALFLIFE_EPSILON: f32 = 1e-5;

/// Converts a half-life (seconds) into a damping coefficient.
///
/// Returns `4·ln2 / (halflife + ε)`. The spring updates use half of this as
/// their exponential decay rate.
///
/// # Example
///
/// ```
/// use motion_spring::{damping_to_halflife, halflife_to_damping};
///
/// let d = halflife_to_damping(0.2);
/// assert!((damping_to_halflife(d) - 0.2).abs() < 1e-3);
/// ```
#[must_use]
pub fn halflife_to_damping(halflife: f32) -> f32 {
    (4.0 * LN_2) / (halflife + HALFLIFE_EPSILON)
}

/// Converts a damping coefficient back into a half-life.
#[must_use]
pub fn damping_to_halflife(damping: f32) -> f32 {
    (4.0 * LN_2) / (damping + HALFLIFE_EPSILON)
}

/// Converts an oscillation frequency (Hz) into a spring stiffness.
#[must_use]
pub fn frequency_to_stiffness(frequency: f32) -> f32 {
    let omega = 2.0 * PI * frequency;
    omega * omega
}

/// Converts a spring stiffness into an oscillation frequency (Hz).
#[must_use]
pub fn stiffness_to_frequency(stiffness: f32) -> f32 {
    stiffness.sqrt() / (2.0 * PI)
}

/// Fraction of the remaining distance a damper covers in `dt`.
///
/// Framerate independent: two steps of `dt` cover exactly as much as one
/// step of `2·dt`.
#[must_use]
pub fn damper_factor(halflife: f32, dt: f32) -> f32 {
    1.0 - (-(LN_2 * dt) / (halflife + HALFLIFE_EPSILON)).exp()
}

/// Moves `x` toward `goal`, halving the distance every `halflife` seconds.
///
/// Works for scalars, vectors and rotations (shortest-path slerp).
///
/// # Example
///
/// ```
/// use motion_spring::damper_implicit;
///
/// let x = damper_implicit(0.0_f32, 10.0, 0.5, 0.5);
/// assert!((x - 5.0).abs() < 1e-3);
/// ```
#[must_use]
pub fn damper_implicit<T: Spring>(x: T, goal: T, halflife: f32, dt: f32) -> T {
    x.interpolate(goal, damper_factor(halflife, dt))
}

/// Portion of a pending `adjustment` to apply during this step.
///
/// Applying the returned amount every step converges on the full adjustment
/// with the given half-life.
#[must_use]
pub fn damp_adjustment_implicit<T: Spring>(adjustment: T, halflife: f32, dt: f32) -> T {
    T::REST.interpolate(adjustment, damper_factor(halflife, dt))
}

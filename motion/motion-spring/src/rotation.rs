//! Quaternion helpers for the rotational springs.
//!
//! Rotational springs work in the scaled angle-axis space (twice the
//! quaternion logarithm), where the scalar spring math applies per axis.

use glam::{Quat, Vec3};

const LOG_EPSILON: f32 = 1e-8;

/// Flips `q` onto the hemisphere with non-negative `w`.
///
/// `q` and `-q` are the same rotation; the positive-`w` one is the
/// shortest-path representative.
#[must_use]
pub fn quat_abs(q: Quat) -> Quat {
    if q.w < 0.0 { -q } else { q }
}

/// Scaled angle-axis vector of `q`: rotation axis times angle in radians.
///
/// # Example
///
/// ```
/// use motion_spring::to_scaled_angle_axis;
/// use glam::{Quat, Vec3};
///
/// let v = to_scaled_angle_axis(Quat::from_rotation_z(0.5));
/// assert!((v - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-5);
/// ```
#[must_use]
pub fn to_scaled_angle_axis(q: Quat) -> Vec3 {
    let v = Vec3::new(q.x, q.y, q.z);
    let length = v.length();
    if length < LOG_EPSILON {
        2.0 * v
    } else {
        let half_angle = length.atan2(q.w);
        2.0 * half_angle * (v / length)
    }
}

/// Rotation for a scaled angle-axis vector. Inverse of [`to_scaled_angle_axis`].
#[must_use]
pub fn from_scaled_angle_axis(v: Vec3) -> Quat {
    let half = v * 0.5;
    let half_angle = half.length();
    if half_angle < LOG_EPSILON {
        Quat::from_xyzw(half.x, half.y, half.z, 1.0).normalize()
    } else {
        let s = half_angle.sin() / half_angle;
        Quat::from_xyzw(s * half.x, s * half.y, s * half.z, half_angle.cos())
    }
}

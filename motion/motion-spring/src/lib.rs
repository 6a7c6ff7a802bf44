//! Critically damped springs and inertialization for animation blending.
//!
//! This crate provides closed-form, half-life parameterized spring math:
//!
//! # Dampers
//!
//! - [`halflife_to_damping`] / [`damping_to_halflife`] - Parameter conversions
//! - [`damper_implicit`] - Exponential approach to a goal
//! - [`damp_adjustment_implicit`] - Per-step share of a pending adjustment
//!
//! # Springs
//!
//! - [`Spring`] - Scalars, vectors and rotations driven by the same math
//! - [`simple_spring_damper`] - Critically damped drive toward a goal
//! - [`decay_spring_damper`] - Critically damped decay toward rest
//!
//! # Inertialization
//!
//! - [`Inertializer`] - Offset state for a single value
//! - [`PoseInertializer`] - Per-bone offsets for a whole skeleton pose
//! - [`InertializeParams`] - Half-life and settle tolerance
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Character controllers
//! - Camera smoothing
//! - Any per-frame blending of positions or rotations
//!
//! # Example
//!
//! ```
//! use motion_spring::Inertializer;
//! use glam::Vec3;
//!
//! let mut root = Inertializer::<Vec3>::new();
//! let old_target = Vec3::new(0.0, 0.0, 1.0);
//! let new_target = Vec3::new(0.3, 0.0, 1.2);
//!
//! // Search jumped to a new frame: absorb the discontinuity
//! root.transition(old_target, Vec3::ZERO, new_target, Vec3::ZERO);
//!
//! // Every step: decay the offset and blend it onto the raw target
//! let (visible, _) = root.update(new_target, Vec3::ZERO, 0.1, 1.0 / 60.0);
//! assert!((visible - old_target).length() < (new_target - old_target).length());
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod damper;
mod error;
mod inertialize;
mod params;
mod rotation;
mod spring;

pub use damper::{
    HALFLIFE_EPSILON, damp_adjustment_implicit, damper_factor, damper_implicit,
    damping_to_halflife, frequency_to_stiffness, halflife_to_damping, stiffness_to_frequency,
};
pub use error::{Result, SpringError};
pub use inertialize::{
    InertializeState, Inertializer, PoseInertializer, inertialize_transition, inertialize_update,
};
pub use params::InertializeParams;
pub use rotation::{from_scaled_angle_axis, quat_abs, to_scaled_angle_axis};
pub use spring::{Spring, decay_spring_damper, simple_spring_damper};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        InertializeParams, InertializeState, Inertializer, PoseInertializer, Spring,
        decay_spring_damper, halflife_to_damping, inertialize_transition, inertialize_update,
        simple_spring_damper,
    };
}

//! Skeleton forward kinematics for animation data.
//!
//! Converts per-bone local transforms (and optionally velocities) into global
//! space by composing each bone with its parent chain:
//!
//! - [`Skeleton`] - Parent array in topological order
//! - [`LocalPose`] / [`LocalMotion`] - One frame of local bone data
//! - [`BoneTransform`] / [`BoneState`] - Global results
//! - [`forward_kinematics_full`] - Every bone in one pass
//! - [`PartialKinematics`] - On-demand evaluation with ancestor caching
//! - [`forward_kinematics_bone`] - One bone, no caching
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Offline animation database builds
//! - Runtime character controllers
//! - Data inspection tools
//!
//! # Example
//!
//! ```
//! use motion_kinematics::{LocalMotion, PartialKinematics, Skeleton};
//! use glam::{Quat, Vec3};
//!
//! let skeleton = Skeleton::from_parent_indices(&[-1, 0]).unwrap();
//! let positions = [Vec3::ZERO, Vec3::X];
//! let velocities = [Vec3::new(0.0, 0.0, 1.0), Vec3::ZERO];
//! let rotations = [Quat::IDENTITY; 2];
//! let angular = [Vec3::ZERO; 2];
//!
//! let motion = LocalMotion::new(&positions, &velocities, &rotations, &angular);
//! let mut fk = PartialKinematics::new(&skeleton, motion).unwrap();
//! let child = fk.bone(1).unwrap();
//! assert!((child.velocity.z - 1.0).abs() < 1e-6);
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

mod error;
mod forward;
mod skeleton;
mod state;

pub use error::{KinematicsError, Result};
pub use forward::{PartialKinematics, forward_kinematics_bone, forward_kinematics_full};
pub use skeleton::{ROOT_PARENT, Skeleton};
pub use state::{BoneState, BoneTransform, KinematicSource, LocalMotion, LocalPose};

// Re-export glam types for convenience
pub use glam::{Quat, Vec3};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        BoneState, BoneTransform, KinematicSource, KinematicsError, LocalMotion, LocalPose,
        PartialKinematics, Skeleton, forward_kinematics_bone, forward_kinematics_full,
    };
}

//! Forward kinematics traversals.
//!
//! Three ways to turn local bone values into global ones:
//!
//! - [`forward_kinematics_full`] computes every bone in one pass.
//! - [`PartialKinematics`] computes bones on demand, caching ancestors so
//!   that a handful of queries per frame only touches the bones they need.
//! - [`forward_kinematics_bone`] evaluates a single bone with no caching.
//!
//! All three walk parent chains root-first with the same composition, so they
//! agree bit for bit on the same input.

use crate::error::Result;
use crate::skeleton::Skeleton;
use crate::state::KinematicSource;

/// Computes the global value of every bone.
///
/// # Errors
///
/// Returns an error if the inputs do not match the skeleton's bone count.
///
/// # Example
///
/// ```
/// use motion_kinematics::{LocalPose, Skeleton, forward_kinematics_full};
/// use glam::{Quat, Vec3};
///
/// let skeleton = Skeleton::from_parent_indices(&[-1, 0, 1]).unwrap();
/// let positions = [Vec3::new(0.0, 1.0, 0.0), Vec3::Y, Vec3::Y];
/// let rotations = [Quat::IDENTITY; 3];
///
/// let globals = forward_kinematics_full(&skeleton, &LocalPose::new(&positions, &rotations)).unwrap();
/// assert!((globals[2].position.y - 3.0).abs() < 1e-6);
/// ```
pub fn forward_kinematics_full<S: KinematicSource>(
    skeleton: &Skeleton,
    source: &S,
) -> Result<Vec<S::Global>> {
    source.validate(skeleton)?;

    let mut globals: Vec<S::Global> = Vec::with_capacity(skeleton.bone_count());
    for (bone, parent) in skeleton.parents().iter().enumerate() {
        let global = match parent {
            // Parents always precede children, so `globals[p]` exists.
            Some(p) => source.child(&globals[*p], bone),
            None => source.root(bone),
        };
        globals.push(global);
    }
    Ok(globals)
}

/// Computes the global value of a single bone by walking its parent chain.
///
/// # Errors
///
/// Returns an error if `bone` is out of range or the inputs do not match the
/// skeleton.
pub fn forward_kinematics_bone<S: KinematicSource>(
    skeleton: &Skeleton,
    source: &S,
    bone: usize,
) -> Result<S::Global> {
    skeleton.check_bone(bone)?;
    source.validate(skeleton)?;

    let mut path = Vec::with_capacity(skeleton.depth(bone) + 1);
    skeleton.chain_into(bone, &mut path);

    let (&root, rest) = path
        .split_first()
        .ok_or_else(|| crate::KinematicsError::bone_out_of_range(bone, skeleton.bone_count()))?;
    let mut global = source.root(root);
    for &b in rest {
        global = source.child(&global, b);
    }
    Ok(global)
}

/// On-demand forward kinematics for one frame.
///
/// Each requested bone computes only the missing part of its parent chain;
/// ancestors computed for earlier requests are reused. Call
/// [`PartialKinematics::reset`] to move on to another frame without
/// reallocating the cache.
///
/// # Example
///
/// ```
/// use motion_kinematics::{LocalPose, PartialKinematics, Skeleton};
/// use glam::{Quat, Vec3};
///
/// let skeleton = Skeleton::from_parent_indices(&[-1, 0, 1, 0]).unwrap();
/// let positions = [Vec3::ZERO, Vec3::X, Vec3::X, Vec3::Z];
/// let rotations = [Quat::IDENTITY; 4];
/// let pose = LocalPose::new(&positions, &rotations);
///
/// let mut fk = PartialKinematics::new(&skeleton, pose).unwrap();
/// let hand = fk.bone(2).unwrap();
/// assert!((hand.position.x - 2.0).abs() < 1e-6);
/// assert!(!fk.is_computed(3));
/// ```
#[derive(Debug)]
pub struct PartialKinematics<'a, S: KinematicSource> {
    skeleton: &'a Skeleton,
    source: S,
    globals: Vec<Option<S::Global>>,
    path: Vec<usize>,
}

impl<'a, S: KinematicSource> PartialKinematics<'a, S> {
    /// Creates an empty cache for one frame of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs do not match the skeleton.
    pub fn new(skeleton: &'a Skeleton, source: S) -> Result<Self> {
        source.validate(skeleton)?;
        Ok(Self {
            skeleton,
            source,
            globals: vec![None; skeleton.bone_count()],
            path: Vec::new(),
        })
    }

    /// Clears the cache and switches to `source`, keeping the buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` does not match the skeleton. The cache is
    /// left untouched in that case.
    pub fn reset(&mut self, source: S) -> Result<()> {
        source.validate(self.skeleton)?;
        self.source = source;
        self.globals.fill(None);
        Ok(())
    }

    /// Global value of `bone`, computing any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if `bone` is out of range.
    pub fn bone(&mut self, bone: usize) -> Result<S::Global> {
        self.skeleton.check_bone(bone)?;
        if let Some(global) = self.globals[bone] {
            return Ok(global);
        }

        // Collect the uncomputed part of the chain, bone first.
        self.path.clear();
        let mut known = None;
        for b in self.skeleton.ancestors(bone) {
            if let Some(global) = self.globals[b] {
                known = Some(global);
                break;
            }
            self.path.push(b);
        }

        let mut parent = known;
        for &b in self.path.iter().rev() {
            let global = match parent {
                Some(p) => self.source.child(&p, b),
                None => self.source.root(b),
            };
            self.globals[b] = Some(global);
            parent = Some(global);
        }

        // The loop above always assigns `bone` last.
        Ok(parent.unwrap_or_else(|| self.source.root(bone)))
    }

    /// Returns true if `bone` has been computed by this traversal.
    #[must_use]
    pub fn is_computed(&self, bone: usize) -> bool {
        self.globals.get(bone).is_some_and(Option::is_some)
    }

    /// Number of bones computed so far.
    #[must_use]
    pub fn computed_count(&self) -> usize {
        self.globals.iter().filter(|g| g.is_some()).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::state::{BoneState, LocalMotion, LocalPose};
    use crate::KinematicsError;
    use approx::assert_relative_eq;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn chain() -> Skeleton {
        Skeleton::from_parent_indices(&[-1, 0, 1, 2, 1]).unwrap()
    }

    fn chain_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(-0.5, 0.0, 0.0),
        ]
    }

    fn chain_rotations() -> Vec<Quat> {
        vec![
            Quat::from_rotation_y(0.4),
            Quat::from_rotation_z(0.3),
            Quat::from_rotation_x(-0.2),
            Quat::IDENTITY,
            Quat::from_rotation_z(1.1),
        ]
    }

    #[test]
    fn full_root_returns_local() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let g = forward_kinematics_full(&s, &LocalPose::new(&p, &r)).unwrap();
        assert_eq!(g[0].position, p[0]);
        assert_eq!(g[0].rotation, r[0]);
    }

    #[test]
    fn full_rotated_parent_moves_child() {
        let s = Skeleton::from_parent_indices(&[-1, 0]).unwrap();
        let p = [Vec3::ZERO, Vec3::X];
        let r = [Quat::from_rotation_z(FRAC_PI_2), Quat::IDENTITY];
        let g = forward_kinematics_full(&s, &LocalPose::new(&p, &r)).unwrap();
        assert_relative_eq!(g[1].position.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(g[1].position.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn full_matches_single_bone() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let pose = LocalPose::new(&p, &r);
        let full = forward_kinematics_full(&s, &pose).unwrap();
        for bone in 0..s.bone_count() {
            assert_eq!(forward_kinematics_bone(&s, &pose, bone).unwrap(), full[bone]);
        }
    }

    #[test]
    fn partial_matches_full_any_order() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let pose = LocalPose::new(&p, &r);
        let full = forward_kinematics_full(&s, &pose).unwrap();

        let mut fk = PartialKinematics::new(&s, pose).unwrap();
        for bone in [3, 0, 4, 2, 1] {
            assert_eq!(fk.bone(bone).unwrap(), full[bone]);
        }
    }

    #[test]
    fn partial_only_computes_chain() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let mut fk = PartialKinematics::new(&s, LocalPose::new(&p, &r)).unwrap();
        fk.bone(4).unwrap();
        assert_eq!(fk.computed_count(), 3);
        assert!(fk.is_computed(0));
        assert!(fk.is_computed(1));
        assert!(!fk.is_computed(2));
        assert!(!fk.is_computed(3));
    }

    #[test]
    fn reset_switches_frame() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let moved: Vec<Vec3> = p.iter().map(|v| *v * 2.0).collect();

        let mut fk = PartialKinematics::new(&s, LocalPose::new(&p, &r)).unwrap();
        fk.bone(3).unwrap();
        fk.reset(LocalPose::new(&moved, &r)).unwrap();
        assert_eq!(fk.computed_count(), 0);

        let full = forward_kinematics_full(&s, &LocalPose::new(&moved, &r)).unwrap();
        for bone in [3, 4, 0] {
            assert_eq!(fk.bone(bone).unwrap(), full[bone]);
        }
    }

    #[test]
    fn reset_rejects_mismatched_input() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let short = vec![Quat::IDENTITY; 2];
        let mut fk = PartialKinematics::new(&s, LocalPose::new(&p, &r)).unwrap();
        fk.bone(2).unwrap();
        assert!(fk.reset(LocalPose::new(&p, &short)).is_err());
        assert!(fk.is_computed(2));
    }

    #[test]
    fn partial_out_of_range() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let mut fk = PartialKinematics::new(&s, LocalPose::new(&p, &r)).unwrap();
        assert!(matches!(
            fk.bone(9),
            Err(KinematicsError::BoneOutOfRange { bone: 9, count: 5 })
        ));
    }

    #[test]
    fn velocity_full_matches_partial() {
        let s = chain();
        let p = chain_positions();
        let r = chain_rotations();
        let v = vec![
            Vec3::new(1.0, 0.0, 0.5),
            Vec3::ZERO,
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::ZERO,
            Vec3::ZERO,
        ];
        let w = vec![
            Vec3::new(0.0, 0.8, 0.0),
            Vec3::new(0.3, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::ZERO,
        ];
        let motion = LocalMotion::new(&p, &v, &r, &w);
        let full = forward_kinematics_full(&s, &motion).unwrap();
        let mut fk = PartialKinematics::new(&s, motion).unwrap();
        for bone in (0..s.bone_count()).rev() {
            let got: BoneState = fk.bone(bone).unwrap();
            assert_eq!(got, full[bone]);
            assert_eq!(got.transform(), forward_kinematics_bone(&s, &motion.pose(), bone).unwrap());
        }
    }

    #[test]
    fn velocity_of_spinning_root() {
        // Root spins about +Y; a child one unit along +X moves along -Z.
        let s = Skeleton::from_parent_indices(&[-1, 0]).unwrap();
        let p = [Vec3::ZERO, Vec3::X];
        let v = [Vec3::ZERO; 2];
        let r = [Quat::IDENTITY; 2];
        let w = [Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO];
        let g = forward_kinematics_bone(&s, &LocalMotion::new(&p, &v, &r, &w), 1).unwrap();
        assert_relative_eq!(g.velocity.z, -3.0, epsilon = 1e-6);
        assert_relative_eq!(g.angular_velocity.y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn full_rejects_mismatched_input() {
        let s = chain();
        let p = chain_positions();
        let r = vec![Quat::IDENTITY; 2];
        assert!(forward_kinematics_full(&s, &LocalPose::new(&p, &r)).is_err());
    }
}

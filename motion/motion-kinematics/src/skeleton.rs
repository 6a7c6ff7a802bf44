//! Skeleton topology.

use crate::error::{KinematicsError, Result};

/// Parent index used by animation loaders to mark a root bone.
pub const ROOT_PARENT: i32 = -1;

/// Bone hierarchy stored as a parent array in topological order.
///
/// Every bone's parent has a strictly smaller index, so a single forward pass
/// over the bones visits each parent before any of its children.
///
/// # Example
///
/// ```
/// use motion_kinematics::Skeleton;
///
/// // root -> hips -> { left leg, right leg }
/// let skeleton = Skeleton::from_parent_indices(&[-1, 0, 1, 1]).unwrap();
/// assert_eq!(skeleton.bone_count(), 4);
/// assert_eq!(skeleton.parent(3), Some(1));
/// assert_eq!(skeleton.depth(3), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    parents: Vec<Option<usize>>,
}

impl Skeleton {
    /// Creates a skeleton from a parent array.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::ParentOrder`] if any parent index is not
    /// strictly smaller than the bone that references it.
    pub fn new(parents: Vec<Option<usize>>) -> Result<Self> {
        for (bone, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                if parent >= bone {
                    return Err(KinematicsError::ParentOrder { bone, parent });
                }
            }
        }
        Ok(Self { parents })
    }

    /// Creates a skeleton from loader-style signed parent indices, where
    /// [`ROOT_PARENT`] marks a root.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::InvalidParent`] for negative indices other
    /// than the sentinel, and [`KinematicsError::ParentOrder`] for parents
    /// that do not precede their children.
    pub fn from_parent_indices(indices: &[i32]) -> Result<Self> {
        let parents = indices
            .iter()
            .enumerate()
            .map(|(bone, &parent)| match parent {
                ROOT_PARENT => Ok(None),
                p => usize::try_from(p)
                    .map(Some)
                    .map_err(|_| KinematicsError::InvalidParent {
                        bone,
                        parent: i64::from(p),
                    }),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(parents)
    }

    /// Number of bones.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if the skeleton has no bones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Parent of `bone`, or `None` for roots and out-of-range bones.
    #[must_use]
    pub fn parent(&self, bone: usize) -> Option<usize> {
        self.parents.get(bone).copied().flatten()
    }

    /// The full parent array.
    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Returns true if `bone` has no parent.
    #[must_use]
    pub fn is_root(&self, bone: usize) -> bool {
        matches!(self.parents.get(bone), Some(None))
    }

    /// Number of ancestors between `bone` and its root.
    #[must_use]
    pub fn depth(&self, bone: usize) -> usize {
        self.ancestors(bone).count().saturating_sub(1)
    }

    /// Iterates from `bone` up to its root, `bone` included.
    pub fn ancestors(&self, bone: usize) -> impl Iterator<Item = usize> + '_ {
        let start = (bone < self.parents.len()).then_some(bone);
        std::iter::successors(start, |&b| self.parent(b))
    }

    /// Checks that `bone` is a valid index.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::BoneOutOfRange`] otherwise.
    pub fn check_bone(&self, bone: usize) -> Result<()> {
        if bone < self.parents.len() {
            Ok(())
        } else {
            Err(KinematicsError::bone_out_of_range(bone, self.parents.len()))
        }
    }

    /// Fills `path` with the chain from the root down to `bone`, inclusive.
    pub(crate) fn chain_into(&self, bone: usize, path: &mut Vec<usize>) {
        path.clear();
        path.extend(self.ancestors(bone));
        path.reverse();
    }
}

//! Two-level axis-aligned bounds over consecutive frames.
//!
//! Frames are grouped into partitions of [`FINE_GRAIN`] and [`COARSE_GRAIN`]
//! consecutive rows. Each partition stores the per-column min and max of its
//! rows, so the distance from a query to the box is a lower bound on the
//! distance to any frame inside it.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{MatchingError, Result};
use crate::matrix::FeatureMatrix;

/// Rows per fine partition.
pub const FINE_GRAIN: usize = 16;

/// Rows per coarse partition.
pub const COARSE_GRAIN: usize = 64;

/// Min/max boxes for one partition size.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundLevel {
    grain: usize,
    min: FeatureMatrix,
    max: FeatureMatrix,
}

impl BoundLevel {
    /// Builds boxes over groups of `grain` consecutive rows of `features`.
    ///
    /// The last partition may hold fewer rows.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] if `grain` is zero.
    pub fn build(features: &FeatureMatrix, grain: usize) -> Result<Self> {
        if grain == 0 {
            return Err(MatchingError::invalid_config("bound grain must be positive"));
        }
        let count = features.rows().div_ceil(grain);
        let cols = features.cols();
        let mut min = FeatureMatrix::filled(count, cols, f32::INFINITY);
        let mut max = FeatureMatrix::filled(count, cols, f32::NEG_INFINITY);

        min.par_rows_mut()
            .zip(max.par_rows_mut())
            .enumerate()
            .for_each(|(p, (lo, hi))| {
                let end = ((p + 1) * grain).min(features.rows());
                for i in p * grain..end {
                    for ((lo, hi), &v) in lo.iter_mut().zip(hi.iter_mut()).zip(features.row(i)) {
                        *lo = lo.min(v);
                        *hi = hi.max(v);
                    }
                }
            });

        debug!(grain, partitions = count, "Built bound level");
        Ok(Self { grain, min, max })
    }

    /// Rows per partition.
    #[must_use]
    pub const fn grain(&self) -> usize {
        self.grain
    }

    /// Number of partitions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.min.rows()
    }

    /// Returns true if there are no partitions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min.rows() == 0
    }

    /// Partition holding `frame`.
    #[must_use]
    pub const fn partition_of(&self, frame: usize) -> usize {
        frame / self.grain
    }

    /// Per-column minimum of partition `p`.
    #[must_use]
    pub fn min(&self, p: usize) -> &[f32] {
        self.min.row(p)
    }

    /// Per-column maximum of partition `p`.
    #[must_use]
    pub fn max(&self, p: usize) -> &[f32] {
        self.max.row(p)
    }

    /// Returns true if `values` lies inside the box of partition `p`.
    #[must_use]
    pub fn contains(&self, p: usize, values: &[f32]) -> bool {
        values
            .iter()
            .zip(self.min(p).iter().zip(self.max(p)))
            .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// `base` plus the squared distance from `query` to the box of
    /// partition `p`, accumulated in column order.
    ///
    /// Stops as soon as the running total reaches `limit`; the returned value
    /// is then only known to be `>= limit`.
    #[must_use]
    pub fn lower_bound(&self, p: usize, query: &[f32], base: f32, limit: f32) -> f32 {
        let mut cost = base;
        for ((&q, &lo), &hi) in query.iter().zip(self.min(p)).zip(self.max(p)) {
            let d = q - q.max(lo).min(hi);
            cost += d * d;
            if cost >= limit {
                break;
            }
        }
        cost
    }
}

/// Fine and coarse [`BoundLevel`]s over one feature matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchBounds {
    fine: BoundLevel,
    coarse: BoundLevel,
}

impl SearchBounds {
    /// Builds both levels.
    ///
    /// # Errors
    ///
    /// Propagates [`BoundLevel::build`] errors.
    pub fn build(features: &FeatureMatrix) -> Result<Self> {
        Ok(Self {
            fine: BoundLevel::build(features, FINE_GRAIN)?,
            coarse: BoundLevel::build(features, COARSE_GRAIN)?,
        })
    }

    /// The 16-frame level.
    #[must_use]
    pub const fn fine(&self) -> &BoundLevel {
        &self.fine
    }

    /// The 64-frame level.
    #[must_use]
    pub const fn coarse(&self) -> &BoundLevel {
        &self.coarse
    }
}

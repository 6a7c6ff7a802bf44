//! Per-column z-score normalization with group weights.
//!
//! Columns are normalized in blocks. Every column of a block gets its own
//! mean but the block shares one scale: the average of its per-column
//! standard deviations divided by the block weight. Sharing the scale keeps
//! the relative magnitudes inside a 3D vector intact.

use std::ops::Range;

use crate::error::{MatchingError, Result};
use crate::matrix::FeatureMatrix;
use crate::params::check_weight;

/// Per-column offset (mean) and scale of a normalized feature matrix.
///
/// # Example
///
/// ```
/// use motion_matching::{FeatureMatrix, Normalization};
///
/// let mut m = FeatureMatrix::from_rows(&[vec![1.0, 10.0], vec![3.0, 30.0]])?;
/// let mut norm = Normalization::identity(2);
/// norm.normalize_columns(&mut m, 0..2, 1.0)?;
///
/// // mean 2 and 20, column stds 1 and 10, shared scale 5.5
/// assert!((norm.offset()[1] - 20.0).abs() < 1e-6);
/// assert!((norm.scale()[0] - 5.5).abs() < 1e-6);
/// assert!((norm.denormalized(m.row(1))?[1] - 30.0).abs() < 1e-5);
/// # Ok::<(), motion_matching::MatchingError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normalization {
    offset: Vec<f32>,
    scale: Vec<f32>,
}

impl Normalization {
    /// Zero offset and unit scale for `width` columns.
    #[must_use]
    pub fn identity(width: usize) -> Self {
        Self {
            offset: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.offset.len()
    }

    /// Per-column offsets.
    #[must_use]
    pub fn offset(&self) -> &[f32] {
        &self.offset
    }

    /// Per-column scales.
    #[must_use]
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Normalizes `columns` of `features` in place and records their
    /// offset and scale. Returns the averaged standard deviation.
    ///
    /// Statistics are population statistics over every row.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] for a bad weight or column
    /// range, and [`MatchingError::DegenerateFeature`] if the averaged
    /// standard deviation is not positive.
    pub fn normalize_columns(
        &mut self,
        features: &mut FeatureMatrix,
        columns: Range<usize>,
        weight: f32,
    ) -> Result<f32> {
        self.normalize_columns_where(features, columns, weight, |_| true)
    }

    /// Like [`Normalization::normalize_columns`], but only rows for which
    /// `include(row)` holds contribute to the statistics and are normalized.
    /// Excluded rows are set to zero in `columns`.
    ///
    /// # Errors
    ///
    /// Same as [`Normalization::normalize_columns`]. A block with no
    /// included rows is degenerate.
    pub fn normalize_columns_where(
        &mut self,
        features: &mut FeatureMatrix,
        columns: Range<usize>,
        weight: f32,
        include: impl Fn(usize) -> bool,
    ) -> Result<f32> {
        check_weight("feature", weight)?;
        if features.cols() != self.width() || columns.is_empty() || columns.end > self.width() {
            return Err(MatchingError::invalid_config(format!(
                "cannot normalize columns {columns:?} of a {}-wide matrix with {} parameters",
                features.cols(),
                self.width()
            )));
        }
        let (start, width) = (columns.start, columns.len());

        let mut count = 0_usize;
        let mut mean = vec![0.0_f64; width];
        for (_, row) in features.iter_rows().enumerate().filter(|(i, _)| include(*i)) {
            count += 1;
            for (m, &v) in mean.iter_mut().zip(&row[columns.clone()]) {
                *m += f64::from(v);
            }
        }
        if count == 0 {
            return Err(MatchingError::degenerate_feature(start, width));
        }
        #[allow(clippy::cast_precision_loss)]
        let rows = count as f64;
        mean.iter_mut().for_each(|m| *m /= rows);

        let mut var = vec![0.0_f64; width];
        for (_, row) in features.iter_rows().enumerate().filter(|(i, _)| include(*i)) {
            for ((s, &m), &v) in var.iter_mut().zip(&mean).zip(&row[columns.clone()]) {
                let d = f64::from(v) - m;
                *s += d * d;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let std = var.iter().map(|s| (s / rows).sqrt()).sum::<f64>() / width as f64;
        #[allow(clippy::cast_possible_truncation)]
        let std = std as f32;
        if !(std > 0.0 && std.is_finite()) {
            return Err(MatchingError::degenerate_feature(start, width));
        }

        let scale = std / weight;
        for (j, &m) in columns.clone().zip(&mean) {
            #[allow(clippy::cast_possible_truncation)]
            let m = m as f32;
            self.offset[j] = m;
            self.scale[j] = scale;
        }
        for (i, row) in features.iter_rows_mut().enumerate() {
            let included = include(i);
            for j in columns.clone() {
                row[j] = if included {
                    (row[j] - self.offset[j]) / self.scale[j]
                } else {
                    0.0
                };
            }
        }
        Ok(std)
    }

    fn check_width(&self, len: usize) -> Result<()> {
        if len == self.width() {
            Ok(())
        } else {
            Err(MatchingError::query_width_mismatch(self.width(), len))
        }
    }

    /// Applies the forward transform `(v - offset) / scale` in place.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] if `values` has the wrong length.
    pub fn normalize(&self, values: &mut [f32]) -> Result<()> {
        self.check_width(values.len())?;
        for ((v, o), s) in values.iter_mut().zip(&self.offset).zip(&self.scale) {
            *v = (*v - o) / s;
        }
        Ok(())
    }

    /// Applies the inverse transform `v * scale + offset` in place.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] if `values` has the wrong length.
    pub fn denormalize(&self, values: &mut [f32]) -> Result<()> {
        self.check_width(values.len())?;
        for ((v, o), s) in values.iter_mut().zip(&self.offset).zip(&self.scale) {
            *v = *v * s + o;
        }
        Ok(())
    }

    /// Normalized copy of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] if `values` has the wrong length.
    pub fn normalized(&self, values: &[f32]) -> Result<Vec<f32>> {
        let mut out = values.to_vec();
        self.normalize(&mut out)?;
        Ok(out)
    }

    /// Denormalized copy of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] if `values` has the wrong length.
    pub fn denormalized(&self, values: &[f32]) -> Result<Vec<f32>> {
        let mut out = values.to_vec();
        self.denormalize(&mut out)?;
        Ok(out)
    }
}

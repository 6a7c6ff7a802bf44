//! Row-major feature matrix.

use rayon::prelude::*;

use crate::error::{MatchingError, Result};

/// Dense row-major `f32` matrix with one row per frame.
///
/// # Example
///
/// ```
/// use motion_matching::FeatureMatrix;
///
/// let mut m = FeatureMatrix::zeros(3, 2);
/// m.row_mut(1).copy_from_slice(&[4.0, 5.0]);
/// assert_eq!(m.get(1, 1), 5.0);
/// assert_eq!(m.column(0).collect::<Vec<_>>(), vec![0.0, 4.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl FeatureMatrix {
    /// Creates a zero-filled matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Creates a matrix with every entry set to `value`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Creates a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if `cols` is zero or `data` is not `rows * cols` long.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if cols == 0 {
            return Err(MatchingError::invalid_config("feature matrix needs at least one column"));
        }
        if data.len() != rows * cols {
            return Err(MatchingError::invalid_config(format!(
                "feature matrix data has {} values, expected {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a matrix from equally sized rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are empty or differ in length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(MatchingError::invalid_config(format!(
                "row {bad} has {} values, expected {cols}",
                rows[bad].len()
            )));
        }
        Self::from_vec(rows.len(), cols, rows.concat())
    }

    /// Number of rows (frames).
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (features).
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the matrix has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// One row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// One row, mutable.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_mut(&mut self, row: usize) -> &mut [f32] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterates over rows.
    pub fn iter_rows(&self) -> std::slice::Chunks<'_, f32> {
        self.data.chunks(self.cols.max(1))
    }

    /// Iterates over rows, mutable.
    pub fn iter_rows_mut(&mut self) -> std::slice::ChunksMut<'_, f32> {
        self.data.chunks_mut(self.cols.max(1))
    }

    /// Parallel iterator over mutable rows.
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, f32> {
        self.data.par_chunks_mut(self.cols.max(1))
    }

    /// Iterates over one column.
    pub fn column(&self, col: usize) -> impl Iterator<Item = f32> + '_ {
        self.iter_rows().map(move |r| r[col])
    }

    /// Row-major backing data.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

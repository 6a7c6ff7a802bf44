//! Branch-and-bound nearest neighbor search over a bounded feature matrix.
//!
//! Candidates are visited clip by clip in frame order. A coarse box whose
//! lower bound already reaches the best cost is skipped whole, then fine
//! boxes likewise, and only the surviving frames are compared exactly.
//! Box lower bounds and frame costs accumulate in the same column order, so
//! pruning never discards a frame the exhaustive scan would pick and both
//! return identical results.

use tracing::trace;

use crate::bounds::{COARSE_GRAIN, FINE_GRAIN, SearchBounds};
use crate::error::{MatchingError, Result};
use crate::matrix::FeatureMatrix;
use crate::params::SearchParams;
use crate::range::{ClipRange, ClipRanges};

/// Best frame found by a search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// Frame index.
    pub index: usize,
    /// Squared distance plus transition cost.
    pub cost: f32,
}

/// `base` plus the squared distance between `query` and `row`, stopping once
/// the total reaches `limit`.
#[must_use]
pub fn frame_cost(query: &[f32], row: &[f32], base: f32, limit: f32) -> f32 {
    let mut cost = base;
    for (&q, &v) in query.iter().zip(row) {
        let d = q - v;
        cost += d * d;
        if cost >= limit {
            break;
        }
    }
    cost
}

/// A normalized feature matrix together with its clip ranges and bounds.
///
/// # Example
///
/// ```
/// use motion_matching::{ClipRanges, FeatureMatrix, SearchIndex, SearchParams};
///
/// let rows: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32, 0.0]).collect();
/// let index = SearchIndex::new(FeatureMatrix::from_rows(&rows)?, ClipRanges::single(100)?)?;
///
/// let best = index.search(&[42.2, 0.0], None, &SearchParams::unrestricted())?.unwrap();
/// assert_eq!(best.index, 42);
/// # Ok::<(), motion_matching::MatchingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SearchIndex {
    features: FeatureMatrix,
    ranges: ClipRanges,
    bounds: SearchBounds,
}

impl SearchIndex {
    /// Builds bounds over `features`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidRanges`] if the ranges were built for a
    /// different number of frames.
    pub fn new(features: FeatureMatrix, ranges: ClipRanges) -> Result<Self> {
        if ranges.frame_count() != features.rows() {
            return Err(MatchingError::invalid_ranges(format!(
                "ranges cover {} frames but the feature matrix has {} rows",
                ranges.frame_count(),
                features.rows()
            )));
        }
        let bounds = SearchBounds::build(&features)?;
        Ok(Self {
            features,
            ranges,
            bounds,
        })
    }

    /// The feature matrix.
    #[must_use]
    pub const fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    /// The clip ranges.
    #[must_use]
    pub const fn ranges(&self) -> &ClipRanges {
        &self.ranges
    }

    /// The bounds.
    #[must_use]
    pub const fn bounds(&self) -> &SearchBounds {
        &self.bounds
    }

    /// Initial best: the current frame's exact cost, without transition penalty.
    fn prepare(&self, query: &[f32], current: Option<usize>) -> Result<Option<SearchResult>> {
        if query.len() != self.features.cols() {
            return Err(MatchingError::query_width_mismatch(
                self.features.cols(),
                query.len(),
            ));
        }
        current
            .map(|index| {
                if self.ranges.contains(index) {
                    Ok(SearchResult {
                        index,
                        cost: frame_cost(query, self.features.row(index), 0.0, f32::INFINITY),
                    })
                } else {
                    Err(MatchingError::frame_outside_ranges(index))
                }
            })
            .transpose()
    }

    /// Finds the frame minimizing squared distance to `query` plus
    /// `params.transition_cost`.
    ///
    /// `query` must already be normalized. When `current` is given its own
    /// cost carries no transition penalty and frames closer to it than
    /// `params.ignore_surrounding` are skipped. The last
    /// `params.ignore_range_end` frames of every clip are never returned.
    ///
    /// Returns `None` only if `current` is `None` and every frame is excluded.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] for a query of the wrong
    /// width and [`MatchingError::FrameOutsideRanges`] for a `current` frame
    /// in no clip.
    pub fn search(
        &self,
        query: &[f32],
        current: Option<usize>,
        params: &SearchParams,
    ) -> Result<Option<SearchResult>> {
        let mut scan = Scan::new(self.prepare(query, current)?, query, current, params);
        let coarse = self.bounds.coarse();
        let fine = self.bounds.fine();

        for range in &self.ranges {
            let end = scan_end(range, params);
            let mut i = range.start;
            while i < end {
                let coarse_next = (i / COARSE_GRAIN + 1) * COARSE_GRAIN;
                let p = coarse.partition_of(i);
                let bound = coarse.lower_bound(p, query, params.transition_cost, scan.best_cost);
                if bound >= scan.best_cost {
                    i = coarse_next;
                    continue;
                }

                while i < coarse_next && i < end {
                    let fine_next = (i / FINE_GRAIN + 1) * FINE_GRAIN;
                    let p = fine.partition_of(i);
                    let bound = fine.lower_bound(p, query, params.transition_cost, scan.best_cost);
                    if bound >= scan.best_cost {
                        i = fine_next;
                        continue;
                    }

                    let stop = fine_next.min(end);
                    for frame in i..stop {
                        scan.visit(frame, self.features.row(frame));
                    }
                    i = stop;
                }
            }
        }

        trace!(best = ?scan.best, "Bounded search finished");
        Ok(scan.best)
    }

    /// Same result as [`SearchIndex::search`], comparing every frame.
    ///
    /// # Errors
    ///
    /// Same as [`SearchIndex::search`].
    pub fn linear_search(
        &self,
        query: &[f32],
        current: Option<usize>,
        params: &SearchParams,
    ) -> Result<Option<SearchResult>> {
        let mut scan = Scan::new(self.prepare(query, current)?, query, current, params);
        for range in &self.ranges {
            for frame in range.start..scan_end(range, params) {
                scan.visit(frame, self.features.row(frame));
            }
        }
        trace!(best = ?scan.best, "Linear search finished");
        Ok(scan.best)
    }
}

fn scan_end(range: &ClipRange, params: &SearchParams) -> usize {
    range.stop.saturating_sub(params.ignore_range_end)
}

/// Running state of one search call.
struct Scan<'a> {
    best: Option<SearchResult>,
    best_cost: f32,
    query: &'a [f32],
    current: Option<usize>,
    params: &'a SearchParams,
}

impl<'a> Scan<'a> {
    fn new(
        best: Option<SearchResult>,
        query: &'a [f32],
        current: Option<usize>,
        params: &'a SearchParams,
    ) -> Self {
        Self {
            best,
            best_cost: best.map_or(f32::INFINITY, |b| b.cost),
            query,
            current,
            params,
        }
    }

    fn visit(&mut self, frame: usize, row: &[f32]) {
        let base = match self.current {
            Some(c) if frame.abs_diff(c) < self.params.ignore_surrounding => return,
            Some(c) if c == frame => 0.0,
            _ => self.params.transition_cost,
        };
        let cost = frame_cost(self.query, row, base, self.best_cost);
        if cost < self.best_cost {
            self.best_cost = cost;
            self.best = Some(SearchResult { index: frame, cost });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    /// One column equal to the frame index, one constant.
    fn line(frames: usize, ranges: Vec<ClipRange>) -> SearchIndex {
        let data = (0..frames).flat_map(|i| [i as f32, 1.0]).collect();
        let features = FeatureMatrix::from_vec(frames, 2, data).unwrap();
        SearchIndex::new(features, ClipRanges::new(ranges, frames).unwrap()).unwrap()
    }

    #[test]
    fn frame_cost_early_out() {
        assert_eq!(frame_cost(&[0.0, 0.0], &[1.0, 2.0], 0.5, f32::INFINITY), 5.5);
        assert_eq!(frame_cost(&[0.0, 0.0], &[1.0, 2.0], 0.5, 1.0), 1.5);
    }

    #[test]
    fn finds_nearest() {
        let index = line(300, vec![ClipRange::new(0, 300)]);
        let best = index
            .search(&[170.3, 1.0], None, &SearchParams::unrestricted())
            .unwrap()
            .unwrap();
        assert_eq!(best.index, 170);
        assert!((best.cost - 0.09).abs() < 1e-4);
    }

    #[test]
    fn ignores_range_tail() {
        let index = line(100, vec![ClipRange::new(0, 100)]);
        let params = SearchParams::unrestricted().ignore_range_end(20);
        let best = index.search(&[95.0, 1.0], None, &params).unwrap().unwrap();
        assert_eq!(best.index, 79);
    }

    #[test]
    fn never_crosses_gap() {
        let index = line(100, vec![ClipRange::new(0, 40), ClipRange::new(60, 100)]);
        let best = index
            .search(&[50.0, 1.0], None, &SearchParams::unrestricted())
            .unwrap()
            .unwrap();
        assert_eq!(best.index, 60);
    }

    #[test]
    fn current_frame_kept_when_nothing_better() {
        let index = line(200, vec![ClipRange::new(0, 200)]);
        let params = SearchParams::default().transition_cost(10.0);
        let best = index.search(&[100.0, 1.0], Some(100), &params).unwrap().unwrap();
        assert_eq!(best.index, 100);
        assert_eq!(best.cost, 0.0);
    }

    #[test]
    fn current_in_range_tail_is_valid_input() {
        let index = line(100, vec![ClipRange::new(0, 100)]);
        let best = index
            .search(&[99.0, 1.0], Some(99), &SearchParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(best.index, 99);
    }

    #[test]
    fn exclusion_window() {
        let index = line(200, vec![ClipRange::new(0, 200)]);
        let params = SearchParams::unrestricted().ignore_surrounding(20);
        // frames 81..=119 are skipped even though 112 is an exact match
        let best = index.search(&[112.0, 1.0], Some(100), &params).unwrap().unwrap();
        assert_eq!(best.index, 120);
    }

    #[test]
    fn none_when_everything_excluded() {
        let index = line(15, vec![ClipRange::new(0, 15)]);
        let params = SearchParams::default();
        assert!(index.search(&[5.0, 1.0], None, &params).unwrap().is_none());
        assert!(index.linear_search(&[5.0, 1.0], None, &params).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_inputs() {
        let index = line(100, vec![ClipRange::new(0, 40), ClipRange::new(60, 100)]);
        let params = SearchParams::default();
        assert!(matches!(
            index.search(&[1.0], None, &params),
            Err(MatchingError::QueryWidthMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            index.search(&[1.0, 1.0], Some(50), &params),
            Err(MatchingError::FrameOutsideRanges { frame: 50 })
        ));
    }

    #[test]
    fn rejects_mismatched_ranges() {
        let features = FeatureMatrix::zeros(10, 2);
        let ranges = ClipRanges::single(11).unwrap();
        assert!(SearchIndex::new(features, ranges).is_err());
    }

    #[test]
    fn matches_linear_search() {
        let index = line(300, vec![ClipRange::new(0, 130), ClipRange::new(140, 300)]);
        for q in [-5.0, 0.0, 17.5, 64.0, 129.0, 135.0, 200.2, 290.0, 400.0] {
            for current in [None, Some(10), Some(150), Some(290)] {
                let params = SearchParams::default().transition_cost(0.25);
                let a = index.search(&[q, 0.0], current, &params).unwrap();
                let b = index.linear_search(&[q, 0.0], current, &params).unwrap();
                assert_eq!(a, b, "query {q} current {current:?}");
            }
        }
    }
}

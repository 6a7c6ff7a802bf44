//! Clip ranges: contiguous, non-overlapping frame intervals.
//!
//! A database stores many clips back to back. Frame offsets (trajectory
//! samples, search candidates) must never leak from one clip into the next,
//! so every offset is clamped into the clip that owns the starting frame.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MatchingError, Result};

/// Half-open frame interval `[start, stop)` of one clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClipRange {
    /// First frame of the clip.
    pub start: usize,
    /// One past the last frame of the clip.
    pub stop: usize,
}

impl ClipRange {
    /// Creates a clip range.
    #[must_use]
    pub const fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Number of frames in the clip.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    /// Returns true if the clip holds no frames.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Returns true if `frame` lies inside the clip.
    #[must_use]
    pub const fn contains(&self, frame: usize) -> bool {
        frame >= self.start && frame < self.stop
    }

    /// Clamps `frame + offset` into the clip, or `None` if the clip is empty.
    ///
    /// `frame` itself is not required to lie inside the clip.
    #[must_use]
    pub fn clamp(&self, frame: usize, offset: isize) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let last = self.stop - 1;
        Some(match frame.checked_add_signed(offset) {
            Some(target) => target.clamp(self.start, last),
            None if offset < 0 => self.start,
            None => last,
        })
    }
}

/// Sorted, disjoint set of [`ClipRange`]s over a database of frames.
///
/// # Example
///
/// ```
/// use motion_matching::{ClipRange, ClipRanges};
///
/// let ranges = ClipRanges::new(vec![ClipRange::new(0, 100), ClipRange::new(100, 180)], 180)?;
///
/// assert_eq!(ranges.clamp_index(90, 20)?, 99);
/// assert_eq!(ranges.clamp_index(110, -20)?, 100);
/// assert!(ranges.clamp_index(180, 0).is_err());
/// # Ok::<(), motion_matching::MatchingError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClipRanges {
    ranges: Vec<ClipRange>,
    frame_count: usize,
}

impl ClipRanges {
    /// Validates and wraps clip ranges over `frame_count` frames.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidRanges`] if there are no ranges, a
    /// range is empty, the ranges are unsorted or overlapping, or a range
    /// extends past `frame_count`.
    pub fn new(ranges: Vec<ClipRange>, frame_count: usize) -> Result<Self> {
        if ranges.is_empty() {
            return Err(MatchingError::invalid_ranges("at least one clip range is required"));
        }
        for (i, range) in ranges.iter().enumerate() {
            if range.is_empty() {
                return Err(MatchingError::invalid_ranges(format!(
                    "range {i} [{}, {}) is empty",
                    range.start, range.stop
                )));
            }
            if range.stop > frame_count {
                return Err(MatchingError::invalid_ranges(format!(
                    "range {i} ends at {} but there are only {frame_count} frames",
                    range.stop
                )));
            }
        }
        if let Some(i) = ranges.windows(2).position(|w| w[1].start < w[0].stop) {
            return Err(MatchingError::invalid_ranges(format!(
                "range {} starts before range {i} ends",
                i + 1
            )));
        }
        Ok(Self { ranges, frame_count })
    }

    /// Builds ranges from parallel start/stop arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if the arrays differ in length or fail [`ClipRanges::new`].
    pub fn from_bounds(starts: &[usize], stops: &[usize], frame_count: usize) -> Result<Self> {
        if starts.len() != stops.len() {
            return Err(MatchingError::invalid_ranges(format!(
                "{} range starts but {} range stops",
                starts.len(),
                stops.len()
            )));
        }
        let ranges = starts
            .iter()
            .zip(stops)
            .map(|(&start, &stop)| ClipRange::new(start, stop))
            .collect();
        Self::new(ranges, frame_count)
    }

    /// A single range covering all frames.
    ///
    /// # Errors
    ///
    /// Returns an error if `frame_count` is zero.
    pub fn single(frame_count: usize) -> Result<Self> {
        Self::new(vec![ClipRange::new(0, frame_count)], frame_count)
    }

    /// Number of clips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always false; construction rejects empty range sets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total number of frames the ranges index into.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The ranges, in frame order.
    #[must_use]
    pub fn as_slice(&self) -> &[ClipRange] {
        &self.ranges
    }

    /// Iterates over the ranges in frame order.
    pub fn iter(&self) -> std::slice::Iter<'_, ClipRange> {
        self.ranges.iter()
    }

    /// The range containing `frame`, if any.
    #[must_use]
    pub fn range_of(&self, frame: usize) -> Option<ClipRange> {
        let after = self.ranges.partition_point(|r| r.start <= frame);
        after
            .checked_sub(1)
            .map(|i| self.ranges[i])
            .filter(|r| r.contains(frame))
    }

    /// Returns true if `frame` lies inside some range.
    #[must_use]
    pub fn contains(&self, frame: usize) -> bool {
        self.range_of(frame).is_some()
    }

    /// Clamps `frame + offset` into the clip containing `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::FrameOutsideRanges`] if `frame` lies in no clip.
    pub fn clamp_index(&self, frame: usize, offset: isize) -> Result<usize> {
        self.range_of(frame)
            .and_then(|r| r.clamp(frame, offset))
            .ok_or_else(|| MatchingError::frame_outside_ranges(frame))
    }
}

impl<'a> IntoIterator for &'a ClipRanges {
    type Item = &'a ClipRange;
    type IntoIter = std::slice::Iter<'a, ClipRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

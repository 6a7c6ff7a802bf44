//! The motion matching database: animation, normalized features and bounds.

use tracing::{info, trace};

use crate::animation::AnimationData;
use crate::bounds::SearchBounds;
use crate::error::{MatchingError, Result};
use crate::features::{FEATURE_COUNT, extract_features};
use crate::matrix::FeatureMatrix;
use crate::normalize::Normalization;
use crate::params::{FeatureConfig, SearchParams};
use crate::range::ClipRanges;
use crate::search::{SearchIndex, SearchResult};

/// Animation data plus everything derived from it for matching.
///
/// Built once, read-only afterwards. Searching takes `&self`, so one
/// database can serve any number of characters and threads.
///
/// # Example
///
/// ```no_run
/// use motion_matching::{AnimationData, FeatureConfig, FeatureDatabase, FeatureQuery, SearchParams};
///
/// # fn load() -> AnimationData { unimplemented!() }
/// let db = FeatureDatabase::build(load(), &FeatureConfig::default())?;
///
/// // Keep the current pose, ask for a new trajectory.
/// let query = FeatureQuery::from_frame(&db, 120)?;
/// let best = db.search(query.as_slice(), Some(120), &SearchParams::default())?;
/// # Ok::<(), motion_matching::MatchingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FeatureDatabase {
    animation: AnimationData,
    config: FeatureConfig,
    normalization: Normalization,
    index: SearchIndex,
}

impl FeatureDatabase {
    /// Extracts, normalizes and bounds the features of `animation`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidConfig`] for bad weights or bones and
    /// [`MatchingError::DegenerateFeature`] if a feature group never varies.
    pub fn build(animation: AnimationData, config: &FeatureConfig) -> Result<Self> {
        info!(
            frames = animation.frame_count(),
            bones = animation.bone_count(),
            clips = animation.ranges().len(),
            "Building feature database"
        );

        let (features, normalization) = extract_features(&animation, config)?;
        let index = SearchIndex::new(features, animation.ranges().clone())?;

        info!(
            frames = animation.frame_count(),
            features = FEATURE_COUNT,
            fine_partitions = index.bounds().fine().len(),
            coarse_partitions = index.bounds().coarse().len(),
            "Feature database built"
        );

        Ok(Self {
            animation,
            config: *config,
            normalization,
            index,
        })
    }

    /// The source animation.
    #[must_use]
    pub const fn animation(&self) -> &AnimationData {
        &self.animation
    }

    /// The configuration the database was built with.
    #[must_use]
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Normalized features, one row per frame.
    #[must_use]
    pub const fn features(&self) -> &FeatureMatrix {
        self.index.features()
    }

    /// Per-column offset and scale.
    #[must_use]
    pub const fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// Fine and coarse bounds.
    #[must_use]
    pub const fn bounds(&self) -> &SearchBounds {
        self.index.bounds()
    }

    /// Clip ranges.
    #[must_use]
    pub const fn ranges(&self) -> &ClipRanges {
        self.index.ranges()
    }

    /// The underlying search index.
    #[must_use]
    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Number of frames.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.animation.frame_count()
    }

    /// Number of feature columns.
    #[must_use]
    pub const fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Clamps `frame + offset` into the clip containing `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::FrameOutsideRanges`] if `frame` lies in no clip.
    pub fn clamp_index(&self, frame: usize, offset: isize) -> Result<usize> {
        self.ranges().clamp_index(frame, offset)
    }

    /// Raw feature values of `frame`, recovered from the normalized matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::FrameOutsideRanges`] if `frame` lies in no clip.
    pub fn denormalized_features(&self, frame: usize) -> Result<Vec<f32>> {
        if !self.ranges().contains(frame) {
            return Err(MatchingError::frame_outside_ranges(frame));
        }
        self.normalization.denormalized(self.features().row(frame))
    }

    /// Normalizes a raw query.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] if `raw` has the wrong length.
    pub fn normalize_query(&self, raw: &[f32]) -> Result<Vec<f32>> {
        self.normalization.normalized(raw)
    }

    /// Normalizes `raw_query` and finds the best matching frame.
    ///
    /// See [`SearchIndex::search`] for the cost model and exclusions.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::QueryWidthMismatch`] or
    /// [`MatchingError::FrameOutsideRanges`] for invalid inputs.
    pub fn search(
        &self,
        raw_query: &[f32],
        current: Option<usize>,
        params: &SearchParams,
    ) -> Result<Option<SearchResult>> {
        let query = self.normalize_query(raw_query)?;
        let best = self.index.search(&query, current, params)?;
        trace!(?current, ?best, "Motion matching search");
        Ok(best)
    }

    /// Like [`FeatureDatabase::search`] but without bound pruning.
    ///
    /// # Errors
    ///
    /// Same as [`FeatureDatabase::search`].
    pub fn linear_search(
        &self,
        raw_query: &[f32],
        current: Option<usize>,
        params: &SearchParams,
    ) -> Result<Option<SearchResult>> {
        let query = self.normalize_query(raw_query)?;
        self.index.linear_search(&query, current, params)
    }
}

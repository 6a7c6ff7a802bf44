//! Motion matching: pick the animation frame that best continues the current
//! motion toward a desired future.
//!
//! Every frame of a clip database is summarized by a fixed 27-value feature
//! vector (foot positions and velocities, hip velocity, and the planar root
//! trajectory one third, two thirds and one second ahead). Features are
//! z-score normalized per group so the squared Euclidean distance between
//! vectors measures how well two frames match.
//!
//! # Building
//!
//! - [`AnimationData`] / [`RawAnimation`] - Validated frame-major bone data
//! - [`ClipRanges`] - Clip boundaries; offsets never cross them
//! - [`FeatureConfig`] - Weights, sampled bones and trajectory offsets
//! - [`FeatureDatabase::build`] - Extraction, normalization and bounds
//!
//! # Searching
//!
//! - [`FeatureQuery`] - Assemble a raw query in layout order
//! - [`FeatureDatabase::search`] - Branch-and-bound nearest frame
//! - [`SearchIndex`] - The same search over any normalized matrix
//!
//! The search prunes 64-frame and then 16-frame boxes whose lower bound
//! already reaches the best cost. Results are identical to
//! [`SearchIndex::linear_search`], which compares every frame.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Offline database builds
//! - Runtime character controllers
//! - Search benchmarking and tuning tools
//!
//! # Example
//!
//! ```
//! use motion_matching::{ClipRanges, FeatureMatrix, SearchIndex, SearchParams};
//!
//! let rows: Vec<Vec<f32>> = (0..256)
//!     .map(|i| vec![(i as f32 * 0.1).sin(), (i as f32 * 0.1).cos()])
//!     .collect();
//! let index = SearchIndex::new(FeatureMatrix::from_rows(&rows)?, ClipRanges::single(256)?)?;
//!
//! let params = SearchParams::default().transition_cost(0.01);
//! let fast = index.search(&[0.0, 1.0], Some(100), &params)?;
//! let slow = index.linear_search(&[0.0, 1.0], Some(100), &params)?;
//! assert_eq!(fast, slow);
//! # Ok::<(), motion_matching::MatchingError>(())
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

mod animation;
mod bounds;
mod database;
mod error;
mod features;
mod matrix;
mod normalize;
mod params;
mod query;
mod range;
mod search;

pub use animation::{AnimationData, RawAnimation};
pub use bounds::{BoundLevel, COARSE_GRAIN, FINE_GRAIN, SearchBounds};
pub use database::FeatureDatabase;
pub use error::{MatchingError, Result};
pub use features::{
    FEATURE_COUNT, FeatureGroup, TRAJECTORY_SAMPLES, extract_features, frame_features,
};
pub use matrix::FeatureMatrix;
pub use normalize::Normalization;
pub use params::{FeatureBones, FeatureConfig, FeatureWeights, SearchParams};
pub use query::FeatureQuery;
pub use range::{ClipRange, ClipRanges};
pub use search::{SearchIndex, SearchResult, frame_cost};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        AnimationData, ClipRange, ClipRanges, FeatureConfig, FeatureDatabase, FeatureQuery,
        FeatureWeights, MatchingError, SearchParams, SearchResult,
    };
}

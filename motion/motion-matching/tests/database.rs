//! End-to-end database construction and search on procedural walk cycles.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

mod common;

use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use motion_matching::{
    AnimationData, FEATURE_COUNT, FeatureConfig, FeatureDatabase, FeatureGroup, FeatureQuery,
    FeatureWeights, MatchingError, RawAnimation, SearchParams, frame_features,
};

fn database(raw: RawAnimation) -> FeatureDatabase {
    let animation = AnimationData::try_from(raw).unwrap();
    FeatureDatabase::build(animation, &FeatureConfig::default()).unwrap()
}

fn column_std(db: &FeatureDatabase, column: usize) -> f32 {
    let n = db.frame_count() as f32;
    let mean = db.features().column(column).sum::<f32>() / n;
    (db.features().column(column).map(|v| (v - mean).powi(2)).sum::<f32>() / n).sqrt()
}

#[test]
fn build_shapes() {
    let db = database(common::walk_cycles(&[200, 160], 1));
    assert_eq!(db.frame_count(), 360);
    assert_eq!(db.feature_count(), FEATURE_COUNT);
    assert_eq!(db.features().rows(), 360);
    assert_eq!(db.bounds().fine().len(), 23);
    assert_eq!(db.bounds().coarse().len(), 6);
    assert_eq!(db.ranges().len(), 2);
}

#[test]
fn normalized_columns_are_centered_and_weighted() {
    let db = database(common::walk_cycles(&[200, 160], 2));
    let weights = FeatureWeights::default();

    for column in 0..FEATURE_COUNT {
        let mean = db.features().column(column).sum::<f32>() / db.frame_count() as f32;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-3);
    }

    // averaged column std of a group equals its weight after normalization
    for group in FeatureGroup::ALL {
        let avg = group.columns().map(|c| column_std(&db, c)).sum::<f32>() / group.width() as f32;
        assert_relative_eq!(avg, group.weight(&weights), max_relative = 1e-3);
    }
}

#[test]
fn denormalized_features_match_raw_extraction() {
    let db = database(common::walk_cycles(&[200, 160], 3));
    for frame in [0, 57, 199, 200, 301, 359] {
        let raw = frame_features(db.animation(), db.config(), frame).unwrap();
        let back = db.denormalized_features(frame).unwrap();
        for (a, b) in raw.iter().zip(&back) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4, max_relative = 1e-4);
        }
    }
}

#[test]
fn features_invariant_under_rigid_root_motion() {
    let config = FeatureConfig::default();
    let raw = common::walk_cycles(&[150, 120], 4);
    let mut moved = raw.clone();
    common::move_root(&mut moved, 1.1, Vec3::new(5.0, 0.0, -3.0));

    let a = AnimationData::try_from(raw).unwrap();
    let b = AnimationData::try_from(moved).unwrap();
    for frame in (0..a.frame_count()).step_by(7) {
        let fa = frame_features(&a, &config, frame).unwrap();
        let fb = frame_features(&b, &config, frame).unwrap();
        for (x, y) in fa.iter().zip(&fb) {
            assert_relative_eq!(*x, *y, epsilon = 1e-3);
        }
    }
}

#[test]
fn trajectory_stays_inside_clip() {
    let db = database(common::walk_cycles(&[100, 100], 5));
    // last frame of the first clip: every future sample is the frame itself
    let row = frame_features(db.animation(), db.config(), 99).unwrap();
    for v in &row[FeatureGroup::TrajectoryPositions.columns()] {
        assert_relative_eq!(*v, 0.0, epsilon = 1e-5);
    }
    let dirs = &row[FeatureGroup::TrajectoryDirections.columns()];
    for sample in dirs.chunks(2) {
        assert_relative_eq!(sample[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(sample[1], 1.0, epsilon = 1e-5);
    }
}

#[test]
fn search_finds_frame_from_its_own_features() {
    let db = database(common::walk_cycles(&[200, 160], 6));
    let params = SearchParams::unrestricted();
    for frame in [10, 77, 150, 230, 320] {
        let query = FeatureQuery::from_frame(&db, frame).unwrap();
        let best = db.search(query.as_slice(), None, &params).unwrap().unwrap();
        assert_eq!(best.index, frame);
        assert!(best.cost < 1e-6);
    }
}

#[test]
fn search_with_new_trajectory_matches_linear_scan() {
    let db = database(common::walk_cycles(&[240, 200, 180], 7));
    let params = SearchParams::default().transition_cost(0.05);

    for (current, turn) in [(30, 0.0_f32), (100, 0.8), (260, -0.6), (500, 1.5)] {
        let dirs = [1.0_f32, 2.0, 3.0].map(|k| Quat::from_rotation_y(turn * k / 3.0) * Vec3::Z);
        let positions = [1.0_f32, 2.0, 3.0].map(|k| dirs[0] * k * 0.5);
        let query = FeatureQuery::from_frame(&db, current)
            .unwrap()
            .trajectory_positions(positions)
            .trajectory_directions(dirs);

        let fast = db.search(query.as_slice(), Some(current), &params).unwrap();
        let slow = db.linear_search(query.as_slice(), Some(current), &params).unwrap();
        assert_eq!(fast, slow);
        assert!(fast.is_some());
    }
}

#[test]
fn search_rejects_wrong_width() {
    let db = database(common::walk_cycles(&[100], 8));
    let err = db.search(&[0.0; 10], None, &SearchParams::default()).unwrap_err();
    assert!(matches!(
        err,
        MatchingError::QueryWidthMismatch {
            expected: FEATURE_COUNT,
            actual: 10
        }
    ));
}

#[test]
fn still_animation_is_degenerate() {
    let mut raw = common::walk_cycles(&[80], 9);
    common::freeze(&mut raw);

    let animation = AnimationData::try_from(raw).unwrap();
    let err = FeatureDatabase::build(animation, &FeatureConfig::default()).unwrap_err();
    assert!(matches!(err, MatchingError::DegenerateFeature { column: 0, width: 3 }));
}

#[test]
fn still_animation_is_degenerate_despite_gaps() {
    let mut raw = common::walk_cycles(&[80], 9);
    common::freeze(&mut raw);
    let raw = common::with_gaps(&raw, 20);
    // gap frames are distinct from the frozen pose
    assert_ne!(raw.bone_positions[1], raw.bone_positions[20 * common::PARENTS.len() + 1]);

    let animation = AnimationData::try_from(raw).unwrap();
    let err = FeatureDatabase::build(animation, &FeatureConfig::default()).unwrap_err();
    assert!(matches!(err, MatchingError::DegenerateFeature { column: 0, width: 3 }));
}

// =============================================================================
// Gaps between clips
// =============================================================================

const GAP: usize = 25;

/// Index in the gapped database of frame `frame` of the contiguous one.
fn gapped_index(plain: &FeatureDatabase, frame: usize) -> usize {
    let clip = plain.ranges().iter().position(|r| r.contains(frame)).unwrap();
    frame + GAP * (clip + 1)
}

#[test]
fn gap_frames_do_not_affect_normalization() {
    let raw = common::walk_cycles(&[200, 160, 120], 12);
    let plain = database(raw.clone());
    let gapped = database(common::with_gaps(&raw, GAP));

    assert_eq!(gapped.frame_count(), plain.frame_count() + 3 * GAP);
    let (a, b) = (plain.normalization(), gapped.normalization());
    for (x, y) in a.offset().iter().zip(b.offset()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-6, max_relative = 1e-6);
    }
    for (x, y) in a.scale().iter().zip(b.scale()) {
        assert_relative_eq!(*x, *y, max_relative = 1e-6);
    }

    for frame in [0, 150, 199, 200, 359, 360, 479] {
        let g = gapped_index(&plain, frame);
        for (x, y) in plain.features().row(frame).iter().zip(gapped.features().row(g)) {
            assert_relative_eq!(*x, *y, epsilon = 1e-5);
        }
    }
    for gap_frame in (0..GAP).chain(225..250) {
        assert!(gapped.features().row(gap_frame).iter().all(|v| *v == 0.0));
    }
}

#[test]
fn gapped_database_round_trips_clip_frames() {
    let raw = common::walk_cycles(&[150, 150], 13);
    let gapped = database(common::with_gaps(&raw, GAP));
    for frame in [GAP, 100, GAP + 149, 2 * GAP + 150, 2 * GAP + 299] {
        let expected = frame_features(gapped.animation(), gapped.config(), frame).unwrap();
        let back = gapped.denormalized_features(frame).unwrap();
        for (a, b) in expected.iter().zip(&back) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4, max_relative = 1e-4);
        }
    }
    assert!(matches!(
        gapped.denormalized_features(GAP + 150),
        Err(MatchingError::FrameOutsideRanges { .. })
    ));
}

#[test]
fn search_never_returns_gap_frames() {
    let raw = common::walk_cycles(&[200, 160, 120], 14);
    let plain = database(raw.clone());
    let gapped = database(common::with_gaps(&raw, GAP));
    let params = SearchParams::default().ignore_surrounding(0).transition_cost(0.05);

    for (current, turn) in [(20, 0.0_f32), (120, 0.9), (230, -0.7), (330, 1.6), (400, -1.2)] {
        let dirs = [1.0_f32, 2.0, 3.0].map(|k| Quat::from_rotation_y(turn * k / 3.0) * Vec3::Z);
        let positions = [1.0_f32, 2.0, 3.0].map(|k| dirs[0] * k * 0.5);
        let query = FeatureQuery::from_frame(&plain, current)
            .unwrap()
            .trajectory_positions(positions)
            .trajectory_directions(dirs);
        let g_current = gapped_index(&plain, current);

        let expected = plain.search(query.as_slice(), Some(current), &params).unwrap().unwrap();
        let fast = gapped.search(query.as_slice(), Some(g_current), &params).unwrap().unwrap();
        let slow = gapped.linear_search(query.as_slice(), Some(g_current), &params).unwrap();

        assert_eq!(Some(fast), slow);
        assert!(gapped.ranges().contains(fast.index));
        assert_eq!(fast.index, gapped_index(&plain, expected.index));
        assert_relative_eq!(fast.cost, expected.cost, epsilon = 1e-4, max_relative = 1e-4);
    }
}

#[test]
fn invalid_weight_rejected() {
    let animation = AnimationData::try_from(common::walk_cycles(&[100], 10)).unwrap();
    let config = FeatureConfig::default().weights(FeatureWeights::default().foot_position(0.0));
    let err = FeatureDatabase::build(animation, &config).unwrap_err();
    assert!(matches!(err, MatchingError::InvalidConfig(_)));
}

#[test]
fn contacts_carried_through() {
    let db = database(common::walk_cycles(&[100], 11));
    assert_eq!(db.animation().contact_count(), 2);
    let contacts = db.animation().contacts(42);
    assert_ne!(contacts[0], contacts[1]);
}

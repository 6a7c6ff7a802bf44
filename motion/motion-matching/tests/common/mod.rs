//! Procedural walk cycles for database tests and benchmarks.

#![allow(dead_code)]

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use motion_matching::RawAnimation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Entity, hips, then left and right leg chains (up leg, leg, foot, toe).
pub const PARENTS: [i32; 10] = [-1, 0, 1, 2, 3, 4, 1, 6, 7, 8];

const FPS: f32 = 60.0;
const STRIDE: f32 = 7.0;

/// One clip per entry of `clip_lengths`, each walking with its own speed
/// and heading drift. `seed` adds small hip jitter so no two frames coincide.
pub fn walk_cycles(clip_lengths: &[usize], seed: u64) -> RawAnimation {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut raw = RawAnimation {
        bone_parents: PARENTS.to_vec(),
        contact_count: 2,
        ..RawAnimation::default()
    };

    let mut start = 0;
    for (clip, &len) in clip_lengths.iter().enumerate() {
        let c = clip as f32;
        let mut root = Vec3::new(3.0 * c, 0.0, 0.0);
        for t in 0..len {
            let s = t as f32 / FPS;
            let speed = 1.0 + 0.5 * c + 0.3 * (0.7 * s).sin();
            let yaw = 0.4 * (0.5 * s + c).sin() + 0.2 * c;
            let yaw_rate = 0.2 * (0.5 * s + c).cos();
            let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
            root += forward * speed / FPS;

            let phase = STRIDE * s;
            let jitter = Vec3::new(
                rng.gen_range(-0.005..0.005),
                rng.gen_range(-0.005..0.005),
                rng.gen_range(-0.005..0.005),
            );

            push(&mut raw, root, forward * speed, Quat::from_rotation_y(yaw), Vec3::Y * yaw_rate);
            push(
                &mut raw,
                Vec3::new(0.0, 0.95 + 0.03 * (2.0 * phase).sin(), 0.0) + jitter,
                Vec3::new(0.0, 0.06 * STRIDE * (2.0 * phase).cos(), 0.0),
                Quat::from_rotation_y(0.1 * phase.sin()),
                Vec3::new(0.0, 0.1 * STRIDE * phase.cos(), 0.0),
            );
            for (side, offset) in [(0.1_f32, 0.0_f32), (-0.1, PI)] {
                let swing = phase + offset;
                push(
                    &mut raw,
                    Vec3::new(side, -0.05, 0.0),
                    Vec3::ZERO,
                    Quat::from_rotation_x(0.5 * swing.sin()),
                    Vec3::new(0.5 * STRIDE * swing.cos(), 0.0, 0.0),
                );
                push(
                    &mut raw,
                    Vec3::new(0.0, -0.45, 0.0),
                    Vec3::ZERO,
                    Quat::from_rotation_x(0.3 + 0.3 * (swing + 1.0).sin()),
                    Vec3::new(0.3 * STRIDE * (swing + 1.0).cos(), 0.0, 0.0),
                );
                push(&mut raw, Vec3::new(0.0, -0.45, 0.0), Vec3::ZERO, Quat::IDENTITY, Vec3::ZERO);
                push(&mut raw, Vec3::new(0.0, -0.05, 0.12), Vec3::ZERO, Quat::IDENTITY, Vec3::ZERO);
            }

            let left_down = phase.sin() < 0.0;
            raw.contact_states.extend([left_down, !left_down]);
        }
        raw.range_starts.push(start);
        raw.range_stops.push(start + len);
        start += len;
    }
    raw
}

fn push(raw: &mut RawAnimation, position: Vec3, velocity: Vec3, rotation: Quat, angular: Vec3) {
    raw.bone_positions.push(position);
    raw.bone_velocities.push(velocity);
    raw.bone_rotations.push(rotation);
    raw.bone_angular_velocities.push(angular);
}

/// Applies the same rigid yaw rotation and translation to every root sample.
pub fn move_root(raw: &mut RawAnimation, yaw: f32, translation: Vec3) {
    let rotation = Quat::from_rotation_y(yaw);
    let bones = raw.bone_parents.len();
    for i in (0..raw.bone_positions.len()).step_by(bones) {
        raw.bone_positions[i] = rotation * raw.bone_positions[i] + translation;
        raw.bone_velocities[i] = rotation * raw.bone_velocities[i];
        raw.bone_rotations[i] = rotation * raw.bone_rotations[i];
        raw.bone_angular_velocities[i] = rotation * raw.bone_angular_velocities[i];
    }
}

/// Inserts `gap` unused frames before every clip of `raw`.
///
/// Gap frames copy the first frame of the following clip with the hips
/// lifted far off the ground, so their poses are unlike anything in a clip.
pub fn with_gaps(raw: &RawAnimation, gap: usize) -> RawAnimation {
    let bones = raw.bone_parents.len();
    let contacts = raw.contact_count;
    let mut out = RawAnimation {
        bone_parents: raw.bone_parents.clone(),
        contact_count: contacts,
        ..RawAnimation::default()
    };

    let copy_frame = |out: &mut RawAnimation, frame: usize, lift: Vec3| {
        for b in 0..bones {
            let i = frame * bones + b;
            let lift = if b == 1 { lift } else { Vec3::ZERO };
            push(
                out,
                raw.bone_positions[i] + lift,
                raw.bone_velocities[i],
                raw.bone_rotations[i],
                raw.bone_angular_velocities[i],
            );
        }
        out.contact_states
            .extend_from_slice(&raw.contact_states[frame * contacts..(frame + 1) * contacts]);
    };

    for (&start, &stop) in raw.range_starts.iter().zip(&raw.range_stops) {
        for _ in 0..gap {
            copy_frame(&mut out, start, Vec3::new(0.0, 3.0, 0.0));
        }
        let first = out.bone_positions.len() / bones;
        for frame in start..stop {
            copy_frame(&mut out, frame, Vec3::ZERO);
        }
        out.range_starts.push(first);
        out.range_stops.push(first + stop - start);
    }
    out
}

/// Replaces every frame of `raw` with its first frame.
pub fn freeze(raw: &mut RawAnimation) {
    let bones = raw.bone_parents.len();
    for i in bones..raw.bone_positions.len() {
        raw.bone_positions[i] = raw.bone_positions[i % bones];
        raw.bone_velocities[i] = raw.bone_velocities[i % bones];
        raw.bone_rotations[i] = raw.bone_rotations[i % bones];
        raw.bone_angular_velocities[i] = raw.bone_angular_velocities[i % bones];
    }
}

/// Random feature rows that drift smoothly, so neighboring frames share tight boxes.
pub fn random_walk_rows(frames: usize, width: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current: Vec<f32> = (0..width).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut data = Vec::with_capacity(frames * width);
    for _ in 0..frames {
        for v in &mut current {
            *v += rng.gen_range(-0.1..0.1);
        }
        data.extend_from_slice(&current);
    }
    data
}

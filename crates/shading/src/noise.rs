//! Sine hash and lattice value noise.

use glam::Vec3;

const HASH_SCALE: f32 = 43758.5453;

/// Largest `f32` strictly below one.
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Lattice id strides. `n = x + 57 y + 113 z` gives every corner of a cell a
/// distinct hash input.
const STRIDE_Y: f32 = 57.0;
const STRIDE_Z: f32 = 113.0;

/// Pseudo-random value in `[0, 1)` derived from `n`.
///
/// Deterministic for a given input. Non-finite intermediates (huge lattice
/// ids) hash to 0.
#[inline]
pub fn hash(n: f32) -> f32 {
    let s = n.sin() * HASH_SCALE;
    if !s.is_finite() {
        return 0.0;
    }
    // s - floor(s) rounds up to exactly 1.0 for tiny negative s.
    (s - s.floor()).min(BELOW_ONE)
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Trilinear value noise in `[0, 1]`.
///
/// The fractional offset is smoothed with `f*f*(3-2f)` so the field is C1
/// continuous across cell faces.
pub fn noise(x: Vec3) -> f32 {
    let p = x.floor();
    let f = x - p;
    let f = f * f * (Vec3::splat(3.0) - 2.0 * f);
    let n = p.x + p.y * STRIDE_Y + STRIDE_Z * p.z;

    let near = mix(
        mix(hash(n), hash(n + 1.0), f.x),
        mix(hash(n + 57.0), hash(n + 58.0), f.x),
        f.y,
    );
    let far = mix(
        mix(hash(n + 113.0), hash(n + 114.0), f.x),
        mix(hash(n + 170.0), hash(n + 171.0), f.x),
        f.y,
    );
    mix(near, far, f.z)
}

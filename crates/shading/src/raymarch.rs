//! Front-to-back raymarching through the density field.

use glam::{Vec3, Vec4};

use crate::density::evaluate;
use crate::saturate;

/// Direction the light arrives from (the sun sits on the -X horizon).
pub const SUN_DIR: Vec3 = Vec3::NEG_X;

/// Fixed iteration budget per ray.
pub const STEPS: u32 = 24;

/// Alpha above which the remaining steps cannot change the result visibly.
pub const OPAQUE_ALPHA: f32 = 0.99;

const SUN_PROBE: f32 = 0.3;
const SCATTER_NORM: f32 = 0.6;
const AMBIENT: Vec3 = Vec3::splat(0.75);
const AMBIENT_GAIN: f32 = 1.35;
const SUN_TINT: Vec3 = Vec3::new(0.9, 0.8, 0.7);
const SUN_GAIN: f32 = 0.45;
const STEP_OPACITY: f32 = 0.35;
const MIN_STEP: f32 = 0.15;
const STEP_GROWTH: f32 = 0.04;
const UNPREMULTIPLY_EPSILON: f32 = 0.001;

/// Distance to advance after sampling at `t`. Sampling gets coarser far from
/// the camera.
#[inline]
pub fn step_size(t: f32) -> f32 {
    MIN_STEP.max(STEP_GROWTH * t)
}

/// Integrates the cloud field along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raymarcher {
    /// Elapsed time forwarded to the density field.
    pub time: f32,
    /// Number of samples along the ray.
    pub steps: u32,
    /// Stop sampling once accumulated alpha exceeds [`OPAQUE_ALPHA`].
    pub early_exit: bool,
}

impl Default for Raymarcher {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Raymarcher {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            steps: STEPS,
            early_exit: true,
        }
    }

    /// Lit, premultiplied contribution of the medium at `pos`.
    fn sample(&self, pos: Vec3) -> Vec4 {
        let s = evaluate(pos, self.time);
        // Density drop towards the sun approximates forward scattering.
        let towards_sun = evaluate(pos + SUN_PROBE * SUN_DIR, self.time).density;
        let dif = saturate((s.density - towards_sun) / SCATTER_NORM);
        let lin = AMBIENT * AMBIENT_GAIN + SUN_GAIN * SUN_TINT * dif;

        let alpha = STEP_OPACITY * s.density;
        (s.color * lin * alpha).extend(alpha)
    }

    /// Colour and opacity seen along `direction` from `origin`.
    ///
    /// `rgb` is un-premultiplied and every channel is saturated.
    pub fn march(&self, origin: Vec3, direction: Vec3) -> Vec4 {
        let mut sum = Vec4::ZERO;
        let mut t = 0.0_f32;

        for _ in 0..self.steps {
            if self.early_exit && sum.w > OPAQUE_ALPHA {
                break;
            }
            let pos = origin + t * direction;
            sum += self.sample(pos) * (1.0 - sum.w);
            t += step_size(t);
        }

        let rgb = sum.truncate() / (UNPREMULTIPLY_EPSILON + sum.w);
        Vec4::new(
            saturate(rgb.x),
            saturate(rgb.y),
            saturate(rgb.z),
            saturate(sum.w),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_size_grows_with_distance() {
        assert_eq!(step_size(0.0), MIN_STEP);
        assert_eq!(step_size(3.0), MIN_STEP);
        assert!((step_size(10.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn empty_sky_is_transparent_black() {
        // Looking straight up from high above the deck never meets cloud.
        let out = Raymarcher::new(0.0).march(Vec3::new(0.0, 50.0, 0.0), Vec3::Y);
        assert_eq!(out, Vec4::ZERO);
    }

    #[test]
    fn solid_cloud_saturates_alpha() {
        let out = Raymarcher::new(0.0).march(Vec3::new(0.0, -3.0, 0.0), Vec3::NEG_Y);
        assert!(out.w > OPAQUE_ALPHA, "alpha {}", out.w);
    }

    #[test]
    fn zero_steps_yields_nothing() {
        let marcher = Raymarcher {
            steps: 0,
            ..Raymarcher::new(1.0)
        };
        assert_eq!(marcher.march(Vec3::ZERO, Vec3::X), Vec4::ZERO);
    }
}

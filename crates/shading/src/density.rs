//! Cloud density field.
//!
//! Two octaves of [`noise`](crate::noise::noise) sampled in a frame that
//! drifts with a constant wind. Density falls off with height so the cloud
//! deck sits below `y = 0.2` with turbulent tops.

use glam::Vec3;

use crate::noise::noise;
use crate::saturate;

/// Displacement per unit of elapsed time.
pub const WIND: Vec3 = Vec3::new(1.0, 0.1, 0.0);

const OCTAVE_WEIGHTS: [f32; 2] = [0.6, 0.4];
const LACUNARITY: f32 = 2.02;
const DECK_HEIGHT: f32 = 0.2;
const TURBULENCE_GAIN: f32 = 3.0;

const HIGHLIGHT_TINT: Vec3 = Vec3::new(1.2, 1.15, 1.1);
const HIGHLIGHT_GAIN: f32 = 1.15;
const SHADOW_TINT: Vec3 = Vec3::splat(0.85);

/// Density and base colour at one point of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensitySample {
    /// Opacity of the medium, always in `[0, 1]`.
    pub density: f32,
    /// Unlit colour, bright at thin edges and flat grey in the core.
    pub color: Vec3,
}

/// Weighted octave sum at `q`.
pub fn turbulence(q: Vec3) -> f32 {
    let mut q = q;
    let mut f = 0.0;
    for weight in OCTAVE_WEIGHTS {
        f += weight * noise(q);
        q *= LACUNARITY;
    }
    f
}

/// Sample the field at `p` after `time` units of wind.
pub fn evaluate(p: Vec3, time: f32) -> DensitySample {
    let q = p - WIND * time;
    let density = saturate(DECK_HEIGHT - p.y + TURBULENCE_GAIN * turbulence(q));
    let color = (HIGHLIGHT_TINT * HIGHLIGHT_GAIN).lerp(SHADOW_TINT, density);
    DensitySample { density, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_below_the_deck_is_opaque() {
        let s = evaluate(Vec3::new(0.3, -5.0, 0.7), 0.0);
        assert_eq!(s.density, 1.0);
        assert!((s.color - SHADOW_TINT).abs().max_element() < 1e-6);
    }

    #[test]
    fn high_above_the_deck_is_empty() {
        let s = evaluate(Vec3::new(0.3, 10.0, 0.7), 0.0);
        assert_eq!(s.density, 0.0);
        assert!((s.color - HIGHLIGHT_TINT * HIGHLIGHT_GAIN).abs().max_element() < 1e-6);
    }

    #[test]
    fn wind_advects_the_field() {
        let p = Vec3::new(0.4, 0.5, 0.2);
        let t = 2.0;
        // Following the wind keeps the turbulence; only the height term moves.
        let carried = evaluate(p + WIND * t, t).density;
        let expected = saturate(DECK_HEIGHT - (p.y + WIND.y * t) + TURBULENCE_GAIN * turbulence(p));
        assert!((carried - expected).abs() < 1e-4, "{carried} vs {expected}");
    }

    #[test]
    fn turbulence_stays_in_unit_range() {
        for i in 0..64 {
            let q = Vec3::new(i as f32 * 0.37, i as f32 * -0.91, i as f32 * 1.3);
            let f = turbulence(q);
            assert!((0.0..=1.0 + 1e-6).contains(&f), "turbulence {f} at {q}");
        }
    }
}

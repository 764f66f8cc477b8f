#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::must_use_candidate
)]
//! # Cloud Shading
//!
//! The per-pixel math behind the volumetric cloud effect. Every function in
//! this crate is pure: nothing here owns mutable state, so a frame can be
//! shaded by any number of threads without synchronization, and the WGSL
//! shader shipped by the `surface` crate evaluates the same formulas on the
//! GPU.
//!
//! ## Layers
//!
//! -   [`noise`]: a sine hash and trilinear lattice value noise.
//! -   [`density`]: cloud density and base colour at a point, advected by a
//!     constant wind over time.
//! -   [`raymarch`]: front-to-back alpha compositing of the density field
//!     along a ray.
//! -   [`scene`]: the orbiting camera, sky gradient and sun glow that turn a
//!     pixel coordinate into a final colour.
//! -   [`uniforms`]: the per-frame values shared by every pixel.
//!
//! ```rust,ignore
//! use shading::{SceneComposer, Uniforms, Vec2};
//!
//! let uniforms = Uniforms::new(800, 600, Vec2::new(400.0, 300.0));
//! let composer = SceneComposer::new(&uniforms);
//! let rgba = composer.shade(Vec2::new(400.5, 300.5));
//! ```

pub mod density;
pub mod noise;
pub mod raymarch;
pub mod scene;
pub mod uniforms;

pub use density::{evaluate, DensitySample};
pub use glam::{Vec2, Vec3, Vec4};
pub use noise::{hash, noise};
pub use raymarch::{Raymarcher, SUN_DIR};
pub use scene::{ndc, to_rgba8, Camera, SceneComposer, LOOK_AT, ORBIT_RADIUS};
pub use uniforms::{GpuUniforms, Uniforms};

/// Clamp to `[0, 1]`. NaN maps to 0 so a degenerate sample can never leak
/// into the composited colour.
#[inline]
pub fn saturate(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

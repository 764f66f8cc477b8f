//! Camera, sky and final composition of one pixel.

use glam::{Vec2, Vec3, Vec4};

use crate::raymarch::{Raymarcher, SUN_DIR};
use crate::saturate;
use crate::uniforms::Uniforms;

/// Point the camera orbits and looks at.
pub const LOOK_AT: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Distance between the camera and [`LOOK_AT`].
pub const ORBIT_RADIUS: f32 = 4.0;

const AZIMUTH_BASE: f32 = 2.75;
const AZIMUTH_GAIN: f32 = 3.0;
const ELEVATION_BASE: f32 = 0.7;

/// Distance of the image plane; sets the field of view.
const FOCAL_LENGTH: f32 = 1.5;

const SKY_BASE: Vec3 = Vec3::new(0.6, 0.71, 0.75);
const SKY_FALLOFF: Vec3 = Vec3::new(1.0, 0.5, 1.0);
const SKY_LIFT: f32 = 0.075;
const SKY_EXPOSURE: f32 = 0.95;
const DISK_TINT: Vec3 = Vec3::new(1.0, 0.6, 0.1);
const DISK_EXPONENT: f32 = 8.0;
const HALO_TINT: Vec3 = Vec3::new(1.0, 0.4, 0.2);
const HALO_EXPONENT: f32 = 3.0;

/// Orbit camera with an orthonormal basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub origin: Vec3,
    pub target: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Place the camera from the pointer position.
    ///
    /// The pointer is mapped to `[-1, 1]` over the surface; x drives the
    /// azimuth and y lifts the camera. The horizontal part of the orbit
    /// direction has unit length, so the forward axis is never parallel to
    /// world up and the basis stays well defined.
    pub fn orbit(pointer: Vec2, resolution: Vec2) -> Self {
        let mo = 2.0 * pointer / resolution - Vec2::ONE;
        let azimuth = AZIMUTH_BASE - AZIMUTH_GAIN * mo.x;
        let heading = Vec3::new(azimuth.cos(), ELEVATION_BASE + (mo.y + 1.0), azimuth.sin());
        let origin = LOOK_AT + ORBIT_RADIUS * heading.normalize();

        let forward = (LOOK_AT - origin).normalize();
        let right = Vec3::Y.cross(forward).normalize();
        let up = forward.cross(right).normalize();

        Self {
            origin,
            target: LOOK_AT,
            forward,
            right,
            up,
        }
    }

    /// Unit ray through the image-plane point `ndc`.
    pub fn ray(&self, ndc: Vec2) -> Vec3 {
        (ndc.x * self.right + ndc.y * self.up + FOCAL_LENGTH * self.forward).normalize()
    }
}

/// Centred, aspect-corrected coordinates of fragment `frag`.
pub fn ndc(frag: Vec2, resolution: Vec2) -> Vec2 {
    let mut p = 2.0 * frag / resolution - Vec2::ONE;
    p.x *= resolution.x / resolution.y;
    p
}

/// Sky gradient plus the sun disk, before clouds are blended in.
pub fn sky(rd: Vec3, sun: f32) -> Vec3 {
    let mut col = SKY_BASE - rd.y * 0.2 * SKY_FALLOFF + Vec3::splat(SKY_LIFT);
    col += 0.2 * DISK_TINT * sun.powf(DISK_EXPONENT);
    col * SKY_EXPOSURE
}

/// Shades pixels of one frame.
///
/// The camera depends only on the uniforms, so it is built once per frame and
/// shared by every pixel.
#[derive(Clone, Copy, Debug)]
pub struct SceneComposer {
    camera: Camera,
    marcher: Raymarcher,
    resolution: Vec2,
}

impl SceneComposer {
    pub fn new(uniforms: &Uniforms) -> Self {
        Self {
            camera: Camera::orbit(uniforms.pointer, uniforms.resolution),
            marcher: Raymarcher::new(uniforms.time),
            resolution: uniforms.resolution,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Opaque colour of fragment `frag` (origin bottom-left, pixel centres at
    /// `+0.5`).
    pub fn shade(&self, frag: Vec2) -> Vec4 {
        let rd = self.camera.ray(ndc(frag, self.resolution));
        let cloud = self.marcher.march(self.camera.origin, rd);

        let sun = saturate(SUN_DIR.dot(rd));
        let mut col = sky(rd, sun).lerp(cloud.truncate(), cloud.w);
        col += 0.1 * HALO_TINT * sun.powf(HALO_EXPONENT);
        col.extend(1.0)
    }

    /// Colour of pixel `(x, row)` of a surface `height` pixels tall, rows
    /// counted from the top.
    pub fn shade_pixel(&self, x: u32, row: u32, height: u32) -> Vec4 {
        let frag = Vec2::new(x as f32 + 0.5, height as f32 - row as f32 - 0.5);
        self.shade(frag)
    }
}

/// Quantize a shaded colour to RGBA8.
pub fn to_rgba8(c: Vec4) -> [u8; 4] {
    let q = |v: f32| (saturate(v) * 255.0 + 0.5) as u8;
    [q(c.x), q(c.y), q(c.z), q(c.w)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_is_orthonormal() {
        let cam = Camera::orbit(Vec2::new(120.0, 470.0), Vec2::new(800.0, 600.0));
        for v in [cam.forward, cam.right, cam.up] {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
        assert!(cam.forward.dot(cam.right).abs() < 1e-5);
        assert!(cam.forward.dot(cam.up).abs() < 1e-5);
        assert!(cam.right.dot(cam.up).abs() < 1e-5);
    }

    #[test]
    fn pointer_off_surface_keeps_a_valid_basis() {
        let cam = Camera::orbit(Vec2::new(-5000.0, 9000.0), Vec2::new(800.0, 600.0));
        assert!(cam.forward.is_finite() && cam.right.is_finite() && cam.up.is_finite());
    }

    #[test]
    fn ndc_is_centred_and_aspect_corrected() {
        let res = Vec2::new(800.0, 600.0);
        assert_eq!(ndc(Vec2::new(400.0, 300.0), res), Vec2::ZERO);
        let corner = ndc(Vec2::new(800.0, 600.0), res);
        assert!((corner.x - 4.0 / 3.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn shaded_pixels_are_opaque() {
        let uniforms = Uniforms::new(64, 48, Vec2::new(32.0, 24.0));
        let composer = SceneComposer::new(&uniforms);
        for (x, row) in [(0, 0), (63, 47), (32, 24), (5, 40)] {
            let c = composer.shade_pixel(x, row, 48);
            assert_eq!(c.w, 1.0);
            assert!(c.truncate().is_finite());
        }
    }

    #[test]
    fn rgba8_quantization_saturates() {
        assert_eq!(to_rgba8(Vec4::new(-1.0, 0.5, 2.0, 1.0)), [0, 128, 255, 255]);
        assert_eq!(to_rgba8(Vec4::new(f32::NAN, 0.0, 1.0, 0.0)), [0, 0, 255, 0]);
    }
}

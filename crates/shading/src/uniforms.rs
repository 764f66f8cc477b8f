//! Per-frame values shared by every pixel.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Inputs of one frame. Written by the animation driver between frames and
/// read-only while a frame is shaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    /// Surface size in pixels.
    pub resolution: Vec2,
    /// Animation clock. Never decreases.
    pub time: f32,
    /// Pointer position in surface pixels.
    pub pointer: Vec2,
}

impl Uniforms {
    pub fn new(width: u32, height: u32, pointer: Vec2) -> Self {
        Self {
            resolution: Vec2::new(width as f32, height as f32),
            time: 0.0,
            pointer,
        }
    }
}

/// Uniform buffer layout of [`Uniforms`] for the WGSL shader.
///
/// Matches `struct Uniforms` in `clouds.wgsl`: the vec2 after `time` needs
/// 8-byte alignment and the struct rounds up to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _pad0: f32,
    pub pointer: [f32; 2],
    pub _pad1: [f32; 2],
}

impl From<&Uniforms> for GpuUniforms {
    fn from(u: &Uniforms) -> Self {
        Self {
            resolution: u.resolution.to_array(),
            time: u.time,
            _pad0: 0.0,
            pointer: u.pointer.to_array(),
            _pad1: [0.0; 2],
        }
    }
}

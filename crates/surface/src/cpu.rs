//! CPU backend: an RGBA8 framebuffer shaded in parallel rows.

use rayon::prelude::*;
use shading::{to_rgba8, SceneComposer, Uniforms};
use tracing::debug;

use crate::{check_size, Node, RenderSurface, SurfaceDesc, SurfaceElement, SurfaceError};

const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug)]
pub struct CpuSurface {
    width: u32,
    height: u32,
    clear: [u8; 4],
    pixels: Vec<u8>,
    element: SurfaceElement,
    released: bool,
    frames: u64,
}

impl CpuSurface {
    pub fn new(desc: &SurfaceDesc) -> Result<Self, SurfaceError> {
        desc.validate()?;
        let element = SurfaceElement::new(desc);
        element.set_size(desc.width, desc.height);
        let clear = desc.clear_rgba();
        Ok(Self {
            width: desc.width,
            height: desc.height,
            clear,
            pixels: cleared(desc.width, desc.height, clear),
            element,
            released: false,
            frames: 0,
        })
    }

    /// Frames rendered since creation.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// RGBA8 value of pixel `(x, row)`, rows counted from the top.
    pub fn pixel(&self, x: u32, row: u32) -> Option<[u8; 4]> {
        if self.released || x >= self.width || row >= self.height {
            return None;
        }
        let i = (row as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[i..i + BYTES_PER_PIXEL]);
        Some(out)
    }
}

fn cleared(width: u32, height: u32, clear: [u8; 4]) -> Vec<u8> {
    clear.repeat(width as usize * height as usize)
}

impl RenderSurface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn element(&self) -> &Node {
        self.element.node()
    }

    fn attach(&mut self, parent: &Node) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        self.element.attach(parent);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        check_size(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels = cleared(width, height, self.clear);
        self.element.set_size(width, height);
        debug!(width, height, "cpu surface resized");
        Ok(())
    }

    fn render(&mut self, uniforms: &Uniforms) -> Result<(), SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        let composer = SceneComposer::new(uniforms);
        let height = self.height;
        let stride = self.width as usize * BYTES_PER_PIXEL;

        self.pixels
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(row, line)| {
                for (x, px) in line.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    px.copy_from_slice(&to_rgba8(composer.shade_pixel(x as u32, row as u32, height)));
                }
            });

        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.element.detach();
        self.pixels = Vec::new();
        self.released = true;
        debug!("cpu surface released");
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn pixels(&self) -> Option<&[u8]> {
        (!self.released).then_some(self.pixels.as_slice())
    }
}

#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
//! Drawable surfaces for the cloud effect and the host collaborators they
//! plug into.
//!
//! A [`RenderSurface`] is created from a [`SurfaceDesc`], attached to a
//! container [`Node`] of a [`Page`], and asked to render one frame per call
//! with the current [`Uniforms`]. Two backends exist:
//!
//! -   [`CpuSurface`] shades every pixel on the CPU through
//!     [`shading::SceneComposer`], one rayon task per row.
//! -   `GpuSurface` (feature `gpu`) runs `clouds.wgsl` on a wgpu device and
//!     reads the frame back.

use std::sync::atomic::{AtomicU64, Ordering};

use shading::Uniforms;
use thiserror::Error;

pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod host;
pub mod pointer;

pub use cpu::CpuSurface;
#[cfg(feature = "gpu")]
pub use gpu::GpuSurface;
pub use host::{ContainerRef, Node, Page};
pub use pointer::{NoPointer, PointerSource, SharedPointer};

/// WGSL source of the cloud shader.
pub const SHADER_SOURCE: &str = include_str!("clouds.wgsl");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface already released")]
    Released,
    #[error("surface size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("surface size {width}x{height} exceeds the device limit of {max} pixels per side")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("render backend not available: {0}")]
    BackendUnavailable(String),
    #[error("gpu error: {0}")]
    Gpu(String),
}

/// Parameters a surface is created with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    /// Background clear colour as `0xRRGGBB`.
    pub clear_color: u32,
    /// Opaque reference to a background image, passed through to the element.
    pub background_image: Option<String>,
}

impl SurfaceDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clear_color: 0,
            background_image: None,
        }
    }

    /// Clear colour as opaque RGBA8.
    pub fn clear_rgba(&self) -> [u8; 4] {
        let [_, r, g, b] = self.clear_color.to_be_bytes();
        [r, g, b, 0xff]
    }

    fn validate(&self) -> Result<(), SurfaceError> {
        check_size(self.width, self.height)
    }
}

pub(crate) fn check_size(width: u32, height: u32) -> Result<(), SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::ZeroSize { width, height });
    }
    Ok(())
}

/// Reject sizes with a side longer than the backend's `max` texture dimension.
#[cfg(any(feature = "gpu", test))]
pub(crate) fn check_max_dimension(width: u32, height: u32, max: u32) -> Result<(), SurfaceError> {
    if width > max || height > max {
        return Err(SurfaceError::TooLarge { width, height, max });
    }
    Ok(())
}

/// The surface contract the animation driver renders through.
pub trait RenderSurface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// The element that represents this surface on the page.
    fn element(&self) -> &Node;

    /// Append the surface element to `parent`.
    fn attach(&mut self, parent: &Node) -> Result<(), SurfaceError>;

    /// Change the pixel dimensions. On error the size is unchanged.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError>;

    /// Draw one frame.
    fn render(&mut self, uniforms: &Uniforms) -> Result<(), SurfaceError>;

    /// Detach from the page and free backend resources. Idempotent.
    fn release(&mut self);

    fn is_released(&self) -> bool;

    /// RGBA8 contents of the last frame, rows top to bottom, when the backend
    /// keeps a CPU copy.
    fn pixels(&self) -> Option<&[u8]> {
        None
    }
}

impl std::fmt::Debug for dyn RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("size", &self.size())
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Page-side bookkeeping shared by the backends: the element node and the
/// parent it is attached to.
#[derive(Debug)]
pub(crate) struct SurfaceElement {
    node: Node,
    parent: Option<Node>,
}

impl SurfaceElement {
    pub(crate) fn new(desc: &SurfaceDesc) -> Self {
        let id = NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed);
        let node = Node::new(format!("canvas#clouds-{id}"));
        node.set_attribute("style", "display:block");
        if let Some(image) = &desc.background_image {
            node.set_attribute("background-image", image.clone());
        }
        Self { node, parent: None }
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn attach(&mut self, parent: &Node) {
        if let Some(old) = self.parent.take() {
            old.remove_child(&self.node);
        }
        parent.append_child(&self.node);
        self.parent = Some(parent.clone());
    }

    pub(crate) fn detach(&mut self) {
        if let Some(parent) = self.parent.take() {
            parent.remove_child(&self.node);
        }
    }

    pub(crate) fn set_size(&self, width: u32, height: u32) {
        self.node.set_attribute("width", width.to_string());
        self.node.set_attribute("height", height.to_string());
    }
}

/// Which backend renders the frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Cpu,
    Gpu,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(format!("unknown backend `{other}`, expected cpu or gpu")),
        }
    }
}

/// Create a surface on `backend`.
///
/// Without the `gpu` feature a GPU request reports
/// [`SurfaceError::BackendUnavailable`].
pub fn create_surface(backend: Backend, desc: &SurfaceDesc) -> Result<Box<dyn RenderSurface>, SurfaceError> {
    match backend {
        Backend::Cpu => Ok(Box::new(CpuSurface::new(desc)?)),
        #[cfg(feature = "gpu")]
        Backend::Gpu => Ok(Box::new(GpuSurface::new(desc)?)),
        #[cfg(not(feature = "gpu"))]
        Backend::Gpu => Err(SurfaceError::BackendUnavailable(
            "built without the `gpu` feature".to_owned(),
        )),
    }
}

/// Create a surface on `backend`, falling back to the CPU when the GPU is not
/// available or cannot hold a target of the requested size.
pub fn create_surface_with_fallback(
    backend: Backend,
    desc: &SurfaceDesc,
) -> Result<Box<dyn RenderSurface>, SurfaceError> {
    match create_surface(backend, desc) {
        Err(e @ (SurfaceError::BackendUnavailable(_) | SurfaceError::TooLarge { .. })) if backend == Backend::Gpu => {
            tracing::info!("GPU surface not usable ({e}), falling back to CPU surface");
            create_surface(Backend::Cpu, desc)
        }
        other => other,
    }
}

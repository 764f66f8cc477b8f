//! # Headless frame loop
//!
//! [`run`] mounts a [`CloudsComponent`] on an in-memory [`Page`], drives it
//! with a [`PacedScheduler`] for a fixed number of frames and writes every
//! Nth frame to disk as PNG. The loop is the same start/pump/destroy sequence
//! an embedding host performs; only the page and the vsync source are
//! simulated.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use driver::{CloudsComponent, CloudsConfig, PacedScheduler};
use image::RgbaImage;
use surface::{Backend, Page, RenderSurface, SharedPointer};
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub config: CloudsConfig,
    pub viewport: (u32, u32),
    pub frames: u64,
    pub fps: f64,
    pub out_dir: Option<PathBuf>,
    pub every: u64,
    pub backend: Backend,
    /// Feed a moving live pointer instead of leaving it unavailable.
    pub sweep: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: CloudsConfig::default(),
            viewport: surface::host::DEFAULT_VIEWPORT,
            frames: 120,
            fps: 60.0,
            out_dir: None,
            every: 30,
            backend: Backend::Cpu,
            sweep: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub frames: u64,
    pub final_time: f32,
    pub size: (u32, u32),
    pub written: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Pointer position for frame `frame` of a sweep: a slow ellipse around the
/// surface centre.
fn sweep_position(frame: u64, size: (u32, u32)) -> (f32, f32) {
    let phase = (frame % 600) as f32 / 600.0 * TAU;
    let (w, h) = (size.0 as f32, size.1 as f32);
    (w * (0.5 + 0.4 * phase.cos()), h * (0.5 + 0.4 * phase.sin()))
}

/// Run the effect for `opts.frames` frames.
///
/// # Errors
///
/// Fails when the component cannot be mounted, the animation stalls, or a
/// frame cannot be written.
pub fn run(opts: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();
    let page = Page::new(opts.viewport.0, opts.viewport.1);
    let resolved = opts.config.resolve(page.viewport());
    info!(
        backend = ?opts.backend,
        width = resolved.width,
        height = resolved.height,
        frames = opts.frames,
        "starting clouds runtime"
    );

    if let Some(dir) = &opts.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let pointer = SharedPointer::new();
    let backend = opts.backend;
    let mut component = CloudsComponent::mount(
        resolved,
        &page,
        |desc| surface::create_surface_with_fallback(backend, desc),
        Box::new(pointer.clone()),
        Box::new(PacedScheduler::new(opts.fps)),
    );
    if let Some(err) = component.error() {
        bail!("failed to mount clouds component: {err}");
    }
    if !component.config().auto_start {
        info!("autoStart disabled in configuration; starting explicitly");
        component.start();
    }

    let mut written = Vec::new();
    let mut produced = 0;
    while produced < opts.frames {
        if opts.sweep {
            let size = component.config();
            let (x, y) = sweep_position(produced, (size.width, size.height));
            pointer.set(x, y);
        }

        let n = component.pump() as u64;
        if n == 0 {
            bail!("animation stalled after {produced} frames");
        }
        produced += n;

        if produced % 60 == 0 {
            debug!(frame = produced, "frame loop progress");
        }
        if let Some(dir) = &opts.out_dir {
            if produced % opts.every.max(1) == 0 {
                if let Some(surface) = component.driver().map(driver::AnimationDriver::surface) {
                    if let Some(path) = write_frame(dir, produced, surface)? {
                        written.push(path);
                    }
                }
            }
        }
    }

    let (final_time, size) = component
        .driver()
        .map(|d| (d.uniforms().time, d.surface().size()))
        .unwrap_or_default();
    component.destroy();

    let summary = RunSummary {
        frames: produced,
        final_time,
        size,
        written,
        elapsed: started.elapsed(),
    };
    info!(
        frames = summary.frames,
        time = summary.final_time,
        written = summary.written.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "clouds runtime finished"
    );
    Ok(summary)
}

/// Save the surface's current frame as `frame_NNNNN.png`. Returns `None` when
/// the backend keeps no CPU copy.
pub fn write_frame(dir: &Path, frame: u64, surface: &dyn RenderSurface) -> Result<Option<PathBuf>> {
    let Some(pixels) = surface.pixels() else {
        warn!(frame, "surface has no readable pixels; skipping frame");
        return Ok(None);
    };
    let (width, height) = surface.size();
    let image = RgbaImage::from_raw(width, height, pixels.to_vec())
        .context("pixel buffer does not match surface size")?;
    let path = dir.join(format!("frame_{frame:05}.png"));
    image
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "frame written");
    Ok(Some(path))
}

//! The animation driver: owns the uniforms and runs the frame loop.
//!
//! Each frame advances the clock by a fixed [`TIME_STEP`], resolves the
//! pointer, writes the uniforms and only then asks the surface to render. At
//! most one frame request is outstanding at a time; a due token that is not
//! the outstanding one is stale and ignored, so `stop` and `destroy` take
//! effect even for callbacks the scheduler already handed out.

use shading::{Uniforms, Vec2};
use surface::{PointerSource, RenderSurface, SurfaceError};
use tracing::{debug, info, warn};

use crate::schedule::{FrameScheduler, FrameToken};

/// Clock advance per frame. Animation speed follows the host frame rate.
pub const TIME_STEP: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
    /// Terminal; the surface has been released.
    Destroyed,
}

/// How the pointer uniform is chosen each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSettings {
    /// Follow the live pointer when one is available.
    pub tracking: bool,
    /// Used when tracking is off or no live position exists.
    pub fixed: Vec2,
}

impl Default for PointerSettings {
    fn default() -> Self {
        Self {
            tracking: true,
            fixed: Vec2::new(400.0, 300.0),
        }
    }
}

pub struct AnimationDriver {
    /// Accumulated in `f64`; the uniform only sees the narrowed value.
    clock: f64,
    uniforms: Uniforms,
    surface: Box<dyn RenderSurface>,
    pointer: Box<dyn PointerSource>,
    scheduler: Box<dyn FrameScheduler>,
    settings: PointerSettings,
    state: DriverState,
    pending: Option<FrameToken>,
    frames: u64,
    render_failing: bool,
}

impl std::fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("clock", &self.clock)
            .field("uniforms", &self.uniforms)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl AnimationDriver {
    /// Build a stopped driver. Resolution comes from the surface, the pointer
    /// starts at the fixed position.
    pub fn new(
        surface: Box<dyn RenderSurface>,
        pointer: Box<dyn PointerSource>,
        scheduler: Box<dyn FrameScheduler>,
        settings: PointerSettings,
    ) -> Self {
        let (width, height) = surface.size();
        Self {
            clock: 0.0,
            uniforms: Uniforms::new(width, height, settings.fixed),
            surface,
            pointer,
            scheduler,
            settings,
            state: DriverState::Stopped,
            pending: None,
            frames: 0,
            render_failing: false,
        }
    }

    pub fn start(&mut self) {
        if self.state != DriverState::Stopped {
            return;
        }
        self.state = DriverState::Running;
        self.pending = Some(self.scheduler.request_frame());
        info!("animation started");
    }

    /// Scheduler callback. Returns whether a frame was produced.
    pub fn on_frame(&mut self, token: FrameToken) -> bool {
        if self.state != DriverState::Running || self.pending != Some(token) {
            debug!(token = token.id(), "stale frame token ignored");
            return false;
        }
        self.pending = None;
        self.tick();
        if self.state == DriverState::Running {
            self.pending = Some(self.scheduler.request_frame());
        }
        true
    }

    /// Advance one frame and render it.
    pub fn tick(&mut self) {
        if self.state == DriverState::Destroyed {
            return;
        }
        self.clock += TIME_STEP;
        self.uniforms.time = self.clock as f32;
        self.uniforms.pointer = self.resolve_pointer();
        self.frames += 1;

        match self.surface.render(&self.uniforms) {
            Ok(()) => {
                if self.render_failing {
                    info!(frame = self.frames, "rendering recovered");
                    self.render_failing = false;
                }
            }
            Err(e) => {
                if !self.render_failing {
                    warn!(frame = self.frames, "render failed: {e}");
                    self.render_failing = true;
                }
            }
        }
    }

    fn resolve_pointer(&self) -> Vec2 {
        if self.settings.tracking {
            if let Some(p) = self.pointer.pointer_position().filter(|p| p.is_finite()) {
                return p;
            }
        }
        self.settings.fixed
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        if self.state == DriverState::Running {
            self.state = DriverState::Stopped;
            info!(frames = self.frames, "animation stopped");
        }
    }

    pub fn destroy(&mut self) {
        if self.state == DriverState::Destroyed {
            return;
        }
        self.stop();
        self.surface.release();
        self.state = DriverState::Destroyed;
        info!("animation destroyed");
    }

    /// Resize the surface and the resolution uniform together. On error
    /// neither changes.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        if self.state == DriverState::Destroyed {
            return Err(SurfaceError::Released);
        }
        self.surface.resize(width, height)?;
        self.uniforms.resolution = Vec2::new(width as f32, height as f32);
        debug!(width, height, "resized");
        Ok(())
    }

    /// Deliver every due frame. Returns how many frames were produced.
    pub fn pump(&mut self) -> usize {
        let mut produced = 0;
        for token in self.scheduler.take_due() {
            if self.on_frame(token) {
                produced += 1;
            }
        }
        produced
    }

    pub fn set_mouse_tracking(&mut self, enabled: bool) {
        self.settings.tracking = enabled;
    }

    pub fn set_fixed_pointer(&mut self, position: Vec2) {
        self.settings.fixed = position;
    }

    pub fn pointer_settings(&self) -> PointerSettings {
        self.settings
    }

    /// Animation clock at full precision.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Frames produced since creation.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &dyn FrameScheduler {
        self.scheduler.as_ref()
    }
}

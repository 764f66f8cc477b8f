//! Embeddable component: mounts a surface on a page and owns its driver.

use shading::Vec2;
use surface::{
    ContainerRef, NoPointer, Page, PointerSource, RenderSurface, SurfaceDesc, SurfaceError,
};
use thiserror::Error;
use tracing::{error, info};

use crate::animation::AnimationDriver;
use crate::config::ResolvedConfig;
use crate::schedule::FrameScheduler;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// A mounted cloud effect.
///
/// When mounting fails the component is inert: it holds no surface, never
/// schedules a frame, and every operation is a no-op. The failure is
/// available from [`error`](Self::error).
#[derive(Debug)]
pub struct CloudsComponent {
    config: ResolvedConfig,
    driver: Option<AnimationDriver>,
    error: Option<ComponentError>,
}

impl CloudsComponent {
    /// Mount into the container named by `config`.
    pub fn mount<F>(
        config: ResolvedConfig,
        page: &Page,
        make_surface: F,
        pointer: Box<dyn PointerSource>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self
    where
        F: FnOnce(&SurfaceDesc) -> Result<Box<dyn RenderSurface>, SurfaceError>,
    {
        let target = ContainerRef::from(config.container.as_str());
        Self::mount_into(config, page, &target, make_surface, pointer, scheduler)
    }

    /// Mount into an explicit container reference, which may be a node handle.
    pub fn mount_into<F>(
        config: ResolvedConfig,
        page: &Page,
        target: &ContainerRef,
        make_surface: F,
        pointer: Box<dyn PointerSource>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Self
    where
        F: FnOnce(&SurfaceDesc) -> Result<Box<dyn RenderSurface>, SurfaceError>,
    {
        let Some(container) = page.resolve(target) else {
            error!("clouds component: container not found: {target}");
            return Self::inert(config, ComponentError::ContainerNotFound(target.to_string()));
        };

        let desc = SurfaceDesc {
            width: config.width,
            height: config.height,
            clear_color: config.background_color,
            background_image: config.background_image.clone(),
        };
        let surface = make_surface(&desc).and_then(|mut s| {
            s.attach(&container)?;
            Ok(s)
        });
        let surface = match surface {
            Ok(s) => s,
            Err(e) => {
                error!("clouds component: failed to create surface: {e}");
                return Self::inert(config, e.into());
            }
        };

        let pointer: Box<dyn PointerSource> = if config.interactive {
            pointer
        } else {
            Box::new(NoPointer)
        };
        let mut driver = AnimationDriver::new(surface, pointer, scheduler, config.pointer_settings());
        info!(
            width = config.width,
            height = config.height,
            container = %target,
            "clouds component mounted"
        );
        if config.auto_start {
            driver.start();
        }

        Self {
            config,
            driver: Some(driver),
            error: None,
        }
    }

    fn inert(config: ResolvedConfig, error: ComponentError) -> Self {
        Self {
            config,
            driver: None,
            error: Some(error),
        }
    }

    pub fn start(&mut self) {
        if let Some(d) = &mut self.driver {
            d.start();
        }
    }

    pub fn stop(&mut self) {
        if let Some(d) = &mut self.driver {
            d.stop();
        }
    }

    pub fn destroy(&mut self) {
        if let Some(d) = &mut self.driver {
            d.destroy();
        }
    }

    /// Resize surface and resolution together. Ignored on an inert component.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ComponentError> {
        let Some(d) = &mut self.driver else {
            return Ok(());
        };
        d.resize(width, height)?;
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    /// Run the frames that are due. Returns how many were produced.
    pub fn pump(&mut self) -> usize {
        self.driver.as_mut().map_or(0, AnimationDriver::pump)
    }

    pub fn set_mouse_tracking(&mut self, enabled: bool) {
        self.config.mouse_tracking = enabled;
        if let Some(d) = &mut self.driver {
            d.set_mouse_tracking(enabled);
        }
    }

    pub fn set_fixed_mouse_position(&mut self, x: f32, y: f32) {
        self.config.fixed_pointer = Vec2::new(x, y);
        if let Some(d) = &mut self.driver {
            d.set_fixed_pointer(Vec2::new(x, y));
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn driver(&self) -> Option<&AnimationDriver> {
        self.driver.as_ref()
    }

    pub fn error(&self) -> Option<&ComponentError> {
        self.error.as_ref()
    }

    pub fn is_inert(&self) -> bool {
        self.driver.is_none()
    }
}

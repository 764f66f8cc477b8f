#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
//! Animation loop and embedding shell for the cloud effect.
//!
//! -   [`schedule`]: frame tokens and the schedulers that deliver them.
//! -   [`animation`]: [`AnimationDriver`], owner of the uniforms and the
//!     start/stop/destroy lifecycle.
//! -   [`config`]: the optional-everything configuration and its defaults.
//! -   [`component`]: [`CloudsComponent`], which resolves a container on a
//!     page, creates the surface and wires up the driver.

pub mod animation;
pub mod component;
pub mod config;
pub mod schedule;

pub use animation::{AnimationDriver, DriverState, PointerSettings, TIME_STEP};
pub use component::{CloudsComponent, ComponentError};
pub use config::{CloudsConfig, ConfigError, ResolvedConfig};
pub use schedule::{FrameQueue, FrameScheduler, FrameToken, PacedScheduler};

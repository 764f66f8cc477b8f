//! Command-line interface of the `clouds` binary.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use driver::config::parse_hex_color;
use driver::CloudsConfig;
use surface::Backend;

use crate::app::RunOptions;

/// Render the volumetric cloud effect headless and optionally dump frames.
#[derive(Parser, Debug, Clone)]
#[command(name = "clouds", version, about)]
pub struct Cli {
    /// JSON configuration file (camelCase keys). Flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Container to mount into.
    #[arg(long)]
    pub container: Option<String>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Host viewport, `WIDTHxHEIGHT`. The default surface is half of it.
    #[arg(long, default_value = "1600x1200", value_parser = parse_size)]
    pub viewport: (u32, u32),

    /// Number of frames to run.
    #[arg(long, default_value_t = 120)]
    pub frames: u64,

    /// Target frame rate; 0 runs unpaced.
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Directory for PNG frames.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write every Nth frame.
    #[arg(long, default_value_t = 30)]
    pub every: u64,

    /// `cpu` or `gpu`. The GPU falls back to the CPU when unavailable.
    #[arg(long, default_value = "cpu")]
    pub backend: Backend,

    /// Fixed pointer `X,Y`; disables tracking.
    #[arg(long, value_parser = parse_point)]
    pub mouse: Option<(f32, f32)>,

    /// Move a simulated live pointer across the surface.
    #[arg(long, conflicts_with = "mouse")]
    pub sweep: bool,

    /// Background colour, `#rrggbb`.
    #[arg(long)]
    pub background: Option<String>,

    /// Watch a directory of WGSL shaders and validate them on change.
    #[arg(long)]
    pub watch: Option<PathBuf>,
}

pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width `{w}`: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height `{h}`: {e}"))?;
    Ok((w, h))
}

pub fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{s}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok((x, y))
}

impl Cli {
    /// Merge the configuration file with the flags.
    pub fn into_options(self) -> Result<RunOptions> {
        let mut config = match &self.config {
            Some(path) => CloudsConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => CloudsConfig::default(),
        };

        if let Some(container) = self.container {
            config.container = Some(container);
        }
        if self.width.is_some() {
            config.width = self.width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if let Some((x, y)) = self.mouse {
            config.mouse_tracking = Some(false);
            config.fixed_mouse_x = Some(x);
            config.fixed_mouse_y = Some(y);
        }
        if self.sweep {
            config.mouse_tracking = Some(true);
            config.interactive = Some(true);
        }
        if let Some(bg) = &self.background {
            let color = parse_hex_color(bg).ok_or_else(|| anyhow!("invalid background colour `{bg}`"))?;
            config.background_color = Some(color);
        }

        Ok(RunOptions {
            config,
            viewport: self.viewport,
            frames: self.frames,
            fps: self.fps,
            out_dir: self.out,
            every: self.every.max(1),
            backend: self.backend,
            sweep: self.sweep,
        })
    }
}

#![deny(clippy::all, clippy::pedantic)]
//! # Clouds
//!
//! Entry point of the `clouds` binary. Parses the command line, installs the
//! `tracing` subscriber (filtered by `RUST_LOG`, `info` by default), optionally
//! starts the shader watcher and runs the frame loop.

use anyhow::Result;
use clap::Parser;
use runtime::{watcher, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let _shader_watcher = match cli.watch.as_deref().map(watcher::start) {
        Some(Ok(w)) => Some(w),
        Some(Err(e)) => {
            tracing::error!("Failed to start shader watcher: {e:?}");
            None
        }
        None => None,
    };

    let summary = runtime::run(&cli.into_options()?)?;
    println!(
        "rendered {} frames at {}x{} in {:.2?}; wrote {} PNG(s)",
        summary.frames,
        summary.size.0,
        summary.size.1,
        summary.elapsed,
        summary.written.len()
    );
    Ok(())
}

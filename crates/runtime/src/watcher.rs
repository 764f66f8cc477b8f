//! # Shader watching
//!
//! Watches a directory for `.wgsl` changes and re-validates every changed file
//! with naga, logging the outcome. Editing `clouds.wgsl` while the runtime is
//! up gives immediate feedback on syntax and validation errors.

use std::path::Path;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::{error, info};

const SHADER_EXTENSION: &str = "wgsl";

/// Parse and validate WGSL source. The error carries naga's rendered report.
pub fn validate_wgsl(source: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;
    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;
    Ok(())
}

fn is_shader_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SHADER_EXTENSION)
}

/// Re-validate one shader file and log the result.
pub fn check_shader(path: &Path) -> bool {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to read shader {}: {e}", path.display());
            return false;
        }
    };
    match validate_wgsl(&source) {
        Ok(()) => {
            info!("shader {} is valid", path.display());
            true
        }
        Err(report) => {
            error!("shader {} failed validation:\n{report}", path.display());
            false
        }
    }
}

/// Start watching `dir`. Dropping the returned watcher stops it.
pub fn start(dir: &Path) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(|res: notify::Result<Event>| match res {
        Ok(event) => {
            if event.kind.is_modify() || event.kind.is_create() {
                for path in event.paths.iter().filter(|p| is_shader_file(p)) {
                    check_shader(path);
                }
            }
        }
        Err(e) => error!("shader watch error: {e:?}"),
    })
    .context("creating shader watcher")?;

    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("watching {}", dir.display()))?;
    info!("watching {} for shader changes", dir.display());
    Ok(watcher)
}

#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]
//! # Clouds Runtime
//!
//! Library half of the `clouds` binary: the command line ([`cli`]), the
//! headless frame loop ([`app`]) and the WGSL watcher ([`watcher`]). Kept in
//! a library so the loop can be exercised from tests without spawning the
//! binary.

pub mod app;
pub mod cli;
pub mod watcher;

pub use app::{run, RunOptions, RunSummary};
pub use cli::Cli;

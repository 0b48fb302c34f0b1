// src/lib.rs

pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod dev;
pub mod errors;
pub mod logging;
pub mod pattern;
pub mod router;
pub mod scaffold;
pub mod types;
pub mod watch;

use tracing::debug;

use crate::cli::CliArgs;
use crate::errors::Result;

pub use crate::config::{ConfigStore, PackageRegistration};
pub use crate::context::ProjectContext;
pub use crate::router::EventRouter;

/// Folder holding every package's handler tree, directly under the handler
/// root.
pub const FUNCTIONS_DIR: &str = "functions";

/// High-level entry point used by `main.rs`.
///
/// Commands operate on the current working directory.
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    debug!(cwd = %cwd.display(), command = ?args.command, "running command");
    commands::dispatch(args.command, &cwd).await
}

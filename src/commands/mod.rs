// src/commands/mod.rs

//! One function per CLI subcommand.
//!
//! Every command takes the working directory explicitly so it can be driven
//! from tests against a temporary project.

pub mod add;
pub mod build;
pub mod dev;
pub mod emit;
pub mod listeners;
pub mod remove;

use std::path::Path;
use std::sync::Arc;

use crate::cli::Command;
use crate::config::ConfigStore;
use crate::context::ProjectContext;
use crate::errors::Result;

pub use add::add;
pub use build::build;
pub use dev::dev;
pub use emit::emit;
pub use listeners::listeners;
pub use remove::{RemoveOutcome, remove};

/// Config store for the project rooted at `cwd`.
pub(crate) fn store_for(cwd: &Path) -> ConfigStore {
    ConfigStore::new(Arc::new(ProjectContext::new(cwd)))
}

/// Run one parsed subcommand from `cwd`.
pub async fn dispatch(command: Command, cwd: &Path) -> Result<()> {
    match command {
        Command::Add { package, event } => {
            add(cwd, &package, &event)?;
        }
        Command::Remove {
            package,
            event,
            files,
            all,
        } => {
            remove(cwd, &package, event.as_deref(), &files, all)?;
        }
        Command::Dev { target } => dev(cwd, target.as_deref()).await?,
        Command::Build { folder } => {
            build(&cwd.join(folder)).await?;
        }
        Command::Emit {
            package,
            event,
            data,
        } => {
            emit(cwd, &package, &event, &data).await?;
        }
        Command::Listeners { package, event } => {
            let out = listeners(cwd, &package, event.as_deref())?;
            println!("{out}");
        }
    }
    Ok(())
}

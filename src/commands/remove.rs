// src/commands/remove.rs

use std::path::{Path, PathBuf};

use crate::errors::{Result, SplitscriptError};
use crate::scaffold;

/// What `remove` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// No event given: the events of the package that have listeners.
    Events(Vec<String>),
    /// No files given: the listener files of the event.
    Files(Vec<String>),
    /// Paths deleted.
    Removed(Vec<PathBuf>),
}

/// Remove listeners of `package`.
///
/// Without an event the existing events are listed; with an event but no
/// files (and no `all`) its listener files are listed instead.
pub fn remove(
    cwd: &Path,
    package: &str,
    event: Option<&str>,
    files: &[String],
    all: bool,
) -> Result<RemoveOutcome> {
    let store = super::store_for(cwd);
    if store.get(package)?.is_none() {
        return Err(SplitscriptError::PackageNotFound(package.to_string()));
    }

    let Some(event) = event else {
        let events = store.existing_events(package)?;
        if events.is_empty() {
            return Err(SplitscriptError::ConfigError(
                "No event listeners exist".to_string(),
            ));
        }
        for event in &events {
            println!("{event}");
        }
        return Ok(RemoveOutcome::Events(events));
    };

    let targets = if all {
        scaffold::handler_files(&store, package, event)?
    } else if files.is_empty() {
        let listed = scaffold::handler_files(&store, package, event)?;
        for file in &listed {
            println!("{file}");
        }
        return Ok(RemoveOutcome::Files(listed));
    } else {
        files.to_vec()
    };

    let removed = scaffold::remove_handlers(&store, package, event, &targets)?;
    Ok(RemoveOutcome::Removed(removed))
}

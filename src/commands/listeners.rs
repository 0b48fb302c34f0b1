// src/commands/listeners.rs

use std::path::Path;
use std::sync::Arc;

use crate::context::ProjectContext;
use crate::errors::Result;
use crate::pattern::split_event;
use crate::router::{EventRouter, ProcessLoader};

/// Listeners of `package` (optionally of one event) as pretty JSON; `null`
/// when the package has no folder.
pub fn listeners(cwd: &Path, package: &str, event: Option<&str>) -> Result<String> {
    let router = EventRouter::new(
        Arc::new(ProjectContext::new(cwd)),
        Arc::new(ProcessLoader::default()),
    );
    let event = event.map(split_event);
    let found = router.listeners(package, event.as_deref())?;
    Ok(serde_json::to_string_pretty(&found)?)
}

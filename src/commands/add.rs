// src/commands/add.rs

use std::path::Path;

use crate::errors::Result;
use crate::scaffold::{self, CreatedHandler};
use crate::watch::relative_str;

/// Create the next listener file for `event` of `package`.
pub fn add(cwd: &Path, package: &str, event: &str) -> Result<CreatedHandler> {
    let store = super::store_for(cwd);
    let created = scaffold::create_handler(&store, package, event)?;

    let shown = relative_str(cwd, &created.path)
        .unwrap_or_else(|| created.path.display().to_string());
    println!("Created {shown} ({})", created.variant.label());
    Ok(created)
}

// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to comparing canonicalized paths when the direct prefix does
/// not match (symlinked temp dirs on macOS report `/private/var/...`).
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize())
        && let Ok(rel) = path_canon.strip_prefix(&root_canon)
    {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    None
}

/// `path` expressed under `root` when it can be related to it.
///
/// Removed files cannot be canonicalized, so only their parent is resolved.
pub fn rebase(root: &Path, path: &Path) -> Option<std::path::PathBuf> {
    if path.starts_with(root) {
        return Some(path.to_path_buf());
    }
    let parent = path.parent()?.canonicalize().ok()?;
    let full = parent.join(path.file_name()?);
    full.starts_with(root).then_some(full)
}

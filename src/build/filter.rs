// src/build/filter.rs

//! Which paths are sources worth compiling.
//!
//! A plain predicate over paths: it never touches the filesystem, so it can
//! also classify paths that were just removed.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions of compilable sources.
pub const SOURCE_EXTENSIONS: [&str; 2] = ["ts", "js"];
/// Dependency folder never compiled or watched.
pub const DEPENDENCY_DIR: &str = "node_modules";

#[derive(Debug, Clone)]
pub struct SourceFilter {
    output_root: PathBuf,
}

impl SourceFilter {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    /// Inside the output tree or a dependency folder.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.starts_with(&self.output_root)
            || path.components().any(|c| c.as_os_str() == OsStr::new(DEPENDENCY_DIR))
    }

    /// Manifest files (`ss.json`, `package.json`, `tsconfig.json`, ...).
    pub fn is_manifest(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
    }

    pub fn has_source_extension(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
    }

    /// A source file that should be compiled into the output tree.
    pub fn is_eligible(&self, path: &Path) -> bool {
        !self.is_ignored(path) && !Self::is_manifest(path) && Self::has_source_extension(path)
    }
}

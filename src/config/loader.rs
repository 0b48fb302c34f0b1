// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::ProjectFile;
use crate::errors::{Result, SplitscriptError};

/// File name of the project file holding the registry and settings.
pub const CONFIG_FILE_NAME: &str = "ss.json";

/// Path of the project file inside `project_root`.
pub fn config_path(project_root: impl AsRef<Path>) -> PathBuf {
    project_root.as_ref().join(CONFIG_FILE_NAME)
}

/// Load a project file from a given path.
///
/// - A missing file yields an empty `ProjectFile`.
/// - A file that is not valid JSON (or has the wrong shape) is an error; it is
///   never silently replaced.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no project file; using empty registry");
            return Ok(ProjectFile::default());
        }
        Err(err) => return Err(err.into()),
    };

    serde_json::from_str(&contents).map_err(|source| SplitscriptError::MalformedConfig {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `ss.json` from `project_root`.
pub fn load(project_root: impl AsRef<Path>) -> Result<ProjectFile> {
    load_from_path(config_path(project_root))
}

/// Write a project file with two-space indentation and a trailing newline.
pub fn save_to_path(path: impl AsRef<Path>, file: &ProjectFile) -> Result<()> {
    let path = path.as_ref();
    let mut contents = serde_json::to_string_pretty(file)?;
    contents.push('\n');
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

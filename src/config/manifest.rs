// src/config/manifest.rs

//! Host manifest inspection: which authoring variant does this project use?

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::config::model::ProjectSettings;
use crate::errors::{Result, SplitscriptError};
use crate::types::{AuthoringVariant, ModuleFormat};

/// Static-typing project marker.
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";
/// Host package manifest.
pub const PACKAGE_MANIFEST_NAME: &str = "package.json";

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default, rename = "type")]
    module_type: Option<String>,
}

/// True when `tsconfig.json` exists in `project_root` or the settings force
/// the typed variant.
pub fn is_typed(project_root: &Path, settings: &ProjectSettings) -> bool {
    project_root.join(TSCONFIG_FILE_NAME).exists() || settings.typescript.unwrap_or(false)
}

/// Read the `type` field of `package.json`; missing file or field means
/// CommonJS.
pub fn module_format(project_root: &Path) -> Result<ModuleFormat> {
    let path = project_root.join(PACKAGE_MANIFEST_NAME);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(ModuleFormat::default()),
        Err(err) => return Err(err.into()),
    };
    let manifest: PackageManifest = serde_json::from_str(&contents)
        .map_err(|source| SplitscriptError::MalformedConfig { path, source })?;

    Ok(manifest
        .module_type
        .and_then(|t| t.parse().ok())
        .unwrap_or_default())
}

/// Pick the authoring variant for new handler files.
pub fn detect_variant(project_root: &Path, settings: &ProjectSettings) -> Result<AuthoringVariant> {
    if is_typed(project_root, settings) {
        return Ok(AuthoringVariant::Typed);
    }
    Ok(module_format(project_root)?.into())
}

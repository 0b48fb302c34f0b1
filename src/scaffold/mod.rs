// src/scaffold/mod.rs

//! Boilerplate for new handler files.
//!
//! [`next_index`] and [`render`] are pure; [`create_handler`],
//! [`remove_handlers`] and [`fill_new_handler`] apply them to a project tree.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{self, ConfigStore};
use crate::errors::{Result, SplitscriptError};
use crate::pattern::{resolve_identifier, split_event};
use crate::types::AuthoringVariant;

/// One greater than the largest numeric stem, or `1` when there is none.
///
/// Non-numeric stems are ignored.
pub fn next_index<I, S>(stems: I) -> u64
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    stems
        .into_iter()
        .filter_map(|stem| stem.as_ref().trim().parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

/// Source text of a new handler.
pub fn render(variant: AuthoringVariant, module_name: &str, event_identifier: &str) -> String {
    match variant {
        AuthoringVariant::Typed => format!(
            "import {{ Events }} from '{module_name}';\n\
             export default async function (event: Events.{event_identifier}) {{\n\n}}"
        ),
        AuthoringVariant::EsModule => format!(
            "/** @typedef {{import('{module_name}').Events.{event_identifier}}} Event */\n\
             /** @param {{Event}} event */\n\n\
             export default async function (event) {{\n\n}}"
        ),
        AuthoringVariant::CommonJs => format!(
            "/** @typedef {{import('{module_name}').Events.{event_identifier}}} Event */\n\
             /** @param {{Event}} event */\n\n\
             module.exports = async function (event) {{\n\n}}"
        ),
    }
}

/// The `ts`/`js` files directly inside `dir`.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_source = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ts") | Some("js")
        );
        if is_source && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn stems(files: &[PathBuf]) -> impl Iterator<Item = &str> {
    files
        .iter()
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()))
}

/// A newly created handler file.
#[derive(Debug, Clone)]
pub struct CreatedHandler {
    pub path: PathBuf,
    pub variant: AuthoringVariant,
}

/// Create the next numbered handler for `event` of `package`.
///
/// The event must be sanctioned by the package's declared patterns.
pub fn create_handler(store: &ConfigStore, package: &str, event: &str) -> Result<CreatedHandler> {
    let file = store.load()?;
    let Some(entry) = file.packages.get(package) else {
        return Err(SplitscriptError::PackageNotFound(package.to_string()));
    };
    if entry.valid_event_patterns.is_empty() {
        return Err(SplitscriptError::ConfigError(format!(
            "no valid events found for package '{package}'"
        )));
    }

    let segments = split_event(event);
    let identifier = resolve_identifier(&entry.valid_event_patterns, &segments).ok_or_else(|| {
        SplitscriptError::ConfigError(format!(
            "'{}' is not a valid event of package '{package}'",
            segments.join("/")
        ))
    })?;

    let project_root = store.context().config_location().to_path_buf();
    let dir = segments
        .iter()
        .fold(store.context().package_dir(package), |acc, seg| acc.join(seg));
    let index = next_index(stems(&source_files(&dir)?));
    fs::create_dir_all(&dir)?;

    let variant = config::detect_variant(&project_root, &file.settings)?;
    let path = dir.join(format!("{index}.{}", variant.extension()));
    fs::write(&path, render(variant, &entry.module_name, &identifier))?;

    info!(
        path = %path.display(),
        variant = %variant,
        "created listener"
    );
    Ok(CreatedHandler { path, variant })
}

/// Delete the named handler files of `event`; returns the paths removed.
///
/// Failures are reported per file and do not stop the remaining deletions.
pub fn remove_handlers(
    store: &ConfigStore,
    package: &str,
    event: &str,
    files: &[String],
) -> Result<Vec<PathBuf>> {
    let dir = split_event(event)
        .iter()
        .fold(store.context().package_dir(package), |acc, seg| acc.join(seg));

    let mut removed = Vec::new();
    for name in files {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %name, "deleted listener");
                removed.push(path);
            }
            Err(err) => warn!(file = %name, error = %err, "failed to delete listener"),
        }
    }
    Ok(removed)
}

/// File names of every handler of `event`.
pub fn handler_files(store: &ConfigStore, package: &str, event: &str) -> Result<Vec<String>> {
    let dir = split_event(event)
        .iter()
        .fold(store.context().package_dir(package), |acc, seg| acc.join(seg));
    Ok(source_files(&dir)?
        .iter()
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect())
}

/// Fill a freshly created, empty file under `functions/` with boilerplate.
///
/// Returns `Ok(false)` when the file is left alone: not empty, outside a
/// registered package, or in a folder the package does not sanction.
pub fn fill_new_handler(store: &ConfigStore, path: &Path) -> Result<bool> {
    let is_empty = fs::metadata(path).map(|m| m.is_file() && m.len() == 0).unwrap_or(false);
    if !is_empty {
        return Ok(false);
    }

    let functions_root = store.context().root().join(crate::FUNCTIONS_DIR);
    let Ok(rel) = path.strip_prefix(&functions_root) else {
        return Ok(false);
    };
    let mut segments: Vec<String> = rel
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    if segments.is_empty() {
        return Ok(false);
    }
    let package = segments.remove(0);

    let file = store.load()?;
    let Some(entry) = file.packages.get(&package) else {
        debug!(package = %package, "file is not under a registered package");
        return Ok(false);
    };
    let Some(identifier) = resolve_identifier(&entry.valid_event_patterns, &segments) else {
        debug!(event = %segments.join("/"), "folder is not a valid event");
        return Ok(false);
    };

    let variant = if path.extension().and_then(|e| e.to_str()) == Some("ts") {
        AuthoringVariant::Typed
    } else {
        config::module_format(store.context().config_location())?.into()
    };

    fs::write(path, render(variant, &entry.module_name, &identifier))?;
    info!(
        file = %path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        "ADDED"
    );
    Ok(true)
}

// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default output directory used by `dev`.
pub const DEFAULT_DEV_DIR: &str = ".ss";
/// Default output directory used by `build`.
pub const DEFAULT_BUILD_DIR: &str = "build";
/// Default runner for compiled JavaScript.
pub const DEFAULT_RUNNER: &str = "node";

/// Top-level project file (`ss.json`) as stored on disk.
///
/// ```json
/// {
///   "packages": {
///     "discord": {
///       "validEventPatterns": ["message/create", "message/*"],
///       "moduleName": "@splitscript.js/discord"
///     }
///   },
///   "dev": ".ss",
///   "build": "build",
///   "main": "index.ts"
/// }
/// ```
///
/// All fields are optional. Keys this crate does not know about are kept in
/// `extra` so that merging a registration never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Package registry keyed by unique package id.
    #[serde(default)]
    pub packages: BTreeMap<String, PackageEntry>,

    #[serde(flatten)]
    pub settings: ProjectSettings,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One registry entry.
///
/// `validEvents` / `packageName` are the field names written by earlier
/// releases; they are accepted on read and rewritten with the current names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageEntry {
    #[serde(alias = "validEvents")]
    pub valid_event_patterns: Vec<String>,
    #[serde(alias = "packageName")]
    pub module_name: String,
}

/// Project-level settings living next to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Output directory for `dev` (default `.ss`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,

    /// Output directory for `build` (default `build`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    /// Entry point source file, relative to the project folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Force the typed authoring variant even without a `tsconfig.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typescript: Option<bool>,

    /// Program used to execute compiled JavaScript (default `node`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<String>,

    /// Compile command template with `{input}` and `{output}` placeholders.
    ///
    /// Absent means esbuild; an empty list copies sources unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<Vec<String>>,
}

impl ProjectSettings {
    pub fn dev_dir(&self) -> &str {
        self.dev.as_deref().unwrap_or(DEFAULT_DEV_DIR)
    }

    pub fn build_dir(&self) -> &str {
        self.build.as_deref().unwrap_or(DEFAULT_BUILD_DIR)
    }

    pub fn runner(&self) -> &str {
        self.runner.as_deref().unwrap_or(DEFAULT_RUNNER)
    }

    /// Entry point name, defaulting on whether the project is typed.
    pub fn main_or_default(&self, typed: bool) -> String {
        match &self.main {
            Some(main) => main.clone(),
            None if typed => "index.ts".to_string(),
            None => "index.js".to_string(),
        }
    }
}

/// A package as declared by an application at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRegistration {
    pub unique_name: String,
    pub module_name: String,
    pub valid_event_patterns: Vec<String>,
}

impl PackageRegistration {
    pub fn new<N, M, P, S>(unique_name: N, module_name: M, patterns: P) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique_name: unique_name.into(),
            module_name: module_name.into(),
            valid_event_patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn from_entry(unique_name: &str, entry: &PackageEntry) -> Self {
        Self {
            unique_name: unique_name.to_string(),
            module_name: entry.module_name.clone(),
            valid_event_patterns: entry.valid_event_patterns.clone(),
        }
    }

    pub(crate) fn to_entry(&self) -> PackageEntry {
        PackageEntry {
            valid_event_patterns: self.valid_event_patterns.clone(),
            module_name: self.module_name.clone(),
        }
    }
}

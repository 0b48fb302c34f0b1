#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value, json};
use splitscript::config::ConfigStore;
use splitscript::context::ProjectContext;
use tempfile::TempDir;

/// Builder for a throwaway project directory with an `ss.json`.
pub struct ProjectBuilder {
    packages: Map<String, Value>,
    settings: Map<String, Value>,
    files: Vec<(PathBuf, String)>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            packages: Map::new(),
            settings: Map::new(),
            files: Vec::new(),
        }
    }

    pub fn with_package(mut self, id: &str, module_name: &str, patterns: &[&str]) -> Self {
        self.packages.insert(
            id.to_string(),
            json!({ "validEventPatterns": patterns, "moduleName": module_name }),
        );
        self
    }

    /// Top-level `ss.json` key, e.g. `("dev", json!("out"))`.
    pub fn with_setting(mut self, key: &str, value: Value) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    /// Copy sources unchanged instead of running esbuild.
    pub fn copy_compiler(self) -> Self {
        self.with_setting("compiler", json!([]))
    }

    pub fn with_file(mut self, rel: &str, contents: &str) -> Self {
        self.files.push((PathBuf::from(rel), contents.to_string()));
        self
    }

    pub fn typescript(self) -> Self {
        self.with_file("tsconfig.json", "{}")
    }

    pub fn es_module(self) -> Self {
        self.with_file("package.json", r#"{ "type": "module" }"#)
    }

    pub fn build(self) -> Project {
        let dir = tempfile::tempdir().expect("create temp project dir");
        let root = dir.path().canonicalize().expect("canonicalize temp dir");

        let mut file = self.settings;
        file.insert("packages".to_string(), Value::Object(self.packages));
        fs::write(
            root.join("ss.json"),
            serde_json::to_string_pretty(&Value::Object(file)).unwrap(),
        )
        .expect("write ss.json");

        for (rel, contents) in self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create parent dir");
            }
            fs::write(&path, contents).expect("write project file");
        }

        Project { _dir: dir, root }
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A project on disk; removed when dropped.
pub struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write project file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path(rel)).expect("read project file")
    }

    pub fn ss_json(&self) -> Value {
        serde_json::from_str(&self.read("ss.json")).expect("parse ss.json")
    }

    pub fn context(&self) -> Arc<ProjectContext> {
        Arc::new(ProjectContext::new(&self.root))
    }

    pub fn store(&self) -> ConfigStore {
        ConfigStore::new(self.context())
    }
}

// src/config/registry.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::loader::{config_path, load_from_path, save_to_path};
use crate::config::model::{PackageRegistration, ProjectFile};
use crate::config::validate::validate_registration;
use crate::context::ProjectContext;
use crate::errors::Result;
use crate::pattern::split_event;

/// Reads and updates the package registry of one project.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    ctx: Arc<ProjectContext>,
}

impl ConfigStore {
    pub fn new(ctx: Arc<ProjectContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<ProjectContext> {
        &self.ctx
    }

    /// Location of `ss.json` for this project.
    pub fn path(&self) -> PathBuf {
        config_path(self.ctx.config_location())
    }

    /// Load the whole project file.
    pub fn load(&self) -> Result<ProjectFile> {
        load_from_path(self.path())
    }

    /// Register a package and merge it into the persisted registry.
    ///
    /// The name is claimed in the context under the write lock, before the
    /// merged file is written; the claim is released again if the write
    /// fails. Other registry entries and unrelated keys are preserved; the
    /// entry for this name is replaced.
    pub fn register(&self, registration: &PackageRegistration) -> Result<()> {
        validate_registration(registration)?;

        let _guard = self.ctx.lock_writes();
        let path = self.path();
        let mut file = load_from_path(&path)?;
        self.ctx.claim_package(&registration.unique_name)?;

        file.packages.insert(
            registration.unique_name.clone(),
            registration.to_entry(),
        );
        if let Err(err) = save_to_path(&path, &file) {
            self.ctx.release_package(&registration.unique_name);
            return Err(err);
        }

        info!(
            package = %registration.unique_name,
            module = %registration.module_name,
            patterns = registration.valid_event_patterns.len(),
            path = %path.display(),
            "registered package"
        );
        Ok(())
    }

    /// Look up a package by id.
    pub fn get(&self, package_id: &str) -> Result<Option<PackageRegistration>> {
        let file = self.load()?;
        Ok(file
            .packages
            .get(package_id)
            .map(|entry| PackageRegistration::from_entry(package_id, entry)))
    }

    /// Declared events of `package_id` whose folder exists and is not empty.
    ///
    /// Returned as slash-joined, lower-cased event names.
    pub fn existing_events(&self, package_id: &str) -> Result<Vec<String>> {
        let Some(registration) = self.get(package_id)? else {
            return Ok(Vec::new());
        };

        let package_dir = self.ctx.package_dir(package_id);
        let mut existing = Vec::new();
        for pattern in registration.valid_event_patterns.iter() {
            let event = split_event(pattern);
            let dir = event.iter().fold(package_dir.clone(), |acc, seg| acc.join(seg));
            let has_entries = match fs::read_dir(&dir) {
                Ok(mut entries) => entries.next().is_some(),
                Err(_) => false,
            };
            if has_entries {
                existing.push(event.join("/"));
            } else {
                debug!(dir = %dir.display(), "event folder missing or empty");
            }
        }
        Ok(existing)
    }
}

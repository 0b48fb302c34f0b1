// src/context.rs

//! Per-project state shared by the config store and the event router.
//!
//! Holds the project roots, the package ids already claimed and the error
//! callbacks consulted when a listener fails. Several contexts can coexist in
//! one process.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;

use crate::errors::{Result, SplitscriptError};
use crate::router::HandlerError;

/// Environment variable overriding the handler root.
pub const ROOT_ENV: &str = "ROOT";
/// Environment variable overriding where `ss.json` is read from.
pub const CONFIG_LOCATION_ENV: &str = "CONFIG_LOCATION";

/// Callback invoked with `(payload, error)` when a listener fails.
pub type ErrorHandler = Arc<dyn Fn(&Value, &HandlerError) + Send + Sync>;

pub struct ProjectContext {
    root: PathBuf,
    config_location: PathBuf,
    registered: Mutex<HashSet<String>>,
    error_handlers: RwLock<Vec<ErrorHandler>>,
    /// Serialises read-merge-write cycles on the project file.
    write_lock: Mutex<()>,
}

impl fmt::Debug for ProjectContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectContext")
            .field("root", &self.root)
            .field("config_location", &self.config_location)
            .finish_non_exhaustive()
    }
}

impl ProjectContext {
    /// Context whose handler tree and project file both live in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::with_locations(root.clone(), root)
    }

    /// Context with a handler root distinct from the project file location.
    ///
    /// The dev supervisor runs compiled code out of the output directory while
    /// `ss.json` stays in the project root.
    pub fn with_locations(root: impl Into<PathBuf>, config_location: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_location: config_location.into(),
            registered: Mutex::new(HashSet::new()),
            error_handlers: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve roots from `ROOT` / `CONFIG_LOCATION`, falling back to the
    /// current working directory.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let root = std::env::var_os(ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.clone());
        let config_location = std::env::var_os(CONFIG_LOCATION_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| root.clone());
        Self::with_locations(root, config_location)
    }

    /// Directory containing `functions/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory containing `ss.json`.
    pub fn config_location(&self) -> &Path {
        &self.config_location
    }

    /// `<root>/functions/<package>`.
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.root.join(crate::FUNCTIONS_DIR).join(package)
    }

    /// Claim `unique_name` for this context.
    ///
    /// A second claim of the same name fails even if the first registration
    /// never reached the disk.
    pub fn claim_package(&self, unique_name: &str) -> Result<()> {
        let mut registered = self
            .registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !registered.insert(unique_name.to_string()) {
            return Err(SplitscriptError::DuplicatePackage(unique_name.to_string()));
        }
        Ok(())
    }

    pub(crate) fn release_package(&self, unique_name: &str) {
        self.registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(unique_name);
    }

    pub fn is_registered(&self, unique_name: &str) -> bool {
        self.registered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(unique_name)
    }

    /// Register a callback that catches errors thrown by listeners.
    pub fn handle_error<F>(&self, handler: F)
    where
        F: Fn(&Value, &HandlerError) + Send + Sync + 'static,
    {
        self.error_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    /// Snapshot of the registered error callbacks.
    pub fn error_handlers(&self) -> Vec<ErrorHandler> {
        self.error_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

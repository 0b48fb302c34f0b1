// src/router/mod.rs

//! Event routing to handler units discovered by folder.
//!
//! `send(package, ["message", "create"], payload)` runs every compiled unit in
//! `<root>/functions/<package>/message/create/`. Each unit is loaded once per
//! dispatch and invoked in its own task; failures are isolated per unit.

pub mod invocable;
pub mod loader;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::context::ProjectContext;
use crate::errors::{Result, SplitscriptError};

pub use invocable::{
    FnHandler, Handler, HandlerError, HandlerLoader, Invocable, LoadedUnit, ShapeDiagnostic,
};
pub use loader::ProcessLoader;

/// Extension of compiled handler units.
pub const COMPILED_EXTENSION: &str = "js";

/// One discovered listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    /// Folder names of the event, e.g. `["message", "create"]`.
    pub event: Vec<String>,
    /// Path of the handler unit.
    pub path: PathBuf,
}

/// Summary of one `send` call.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Units whose entry point ran to completion.
    pub invoked: usize,
    /// Units that failed and were passed to the error callbacks.
    pub handled_errors: usize,
    /// Units skipped because they expose no supported entry point.
    pub diagnostics: Vec<ShapeDiagnostic>,
    /// Units that could not be loaded.
    pub load_failures: Vec<HandlerError>,
}

enum UnitOutcome {
    Invoked,
    Failed(HandlerError),
    Shape(ShapeDiagnostic),
    LoadFailed(HandlerError),
}

/// Dispatches events of any registered package of one project.
#[derive(Clone)]
pub struct EventRouter {
    ctx: Arc<ProjectContext>,
    loader: Arc<dyn HandlerLoader>,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl EventRouter {
    pub fn new(ctx: Arc<ProjectContext>, loader: Arc<dyn HandlerLoader>) -> Self {
        Self { ctx, loader }
    }

    pub fn context(&self) -> &Arc<ProjectContext> {
        &self.ctx
    }

    fn event_dir<S: AsRef<str>>(&self, package_id: &str, event: &[S]) -> PathBuf {
        event
            .iter()
            .fold(self.ctx.package_dir(package_id), |acc, seg| acc.join(seg.as_ref()))
    }

    /// Send `payload` to every listener of `event`.
    ///
    /// A missing event folder means zero listeners. When a listener fails and
    /// error callbacks are registered on the context, each callback receives
    /// `(payload, error)` and the failure stops there. Without callbacks the
    /// first failure is returned, after every sibling listener has finished.
    pub async fn send<S: AsRef<str>>(
        &self,
        package_id: &str,
        event: &[S],
        payload: Value,
    ) -> Result<DispatchReport> {
        let dir = self.event_dir(package_id, event);
        let files = compiled_units(&dir)?;
        debug!(dir = %dir.display(), units = files.len(), "dispatching event");

        let payload = Arc::new(payload);
        let mut set = JoinSet::new();
        for file in files {
            let loader = Arc::clone(&self.loader);
            let payload = Arc::clone(&payload);
            set.spawn(async move { run_unit(loader, file, payload).await });
        }

        let handlers = self.ctx.error_handlers();
        let mut report = DispatchReport::default();
        let mut unhandled: Option<HandlerError> = None;

        while let Some(joined) = set.join_next().await {
            let outcome = joined.map_err(|e| anyhow::anyhow!("listener task panicked: {e}"))?;
            match outcome {
                UnitOutcome::Invoked => report.invoked += 1,
                UnitOutcome::Shape(diag) => {
                    warn!("{diag}");
                    report.diagnostics.push(diag);
                }
                UnitOutcome::LoadFailed(err) => {
                    warn!(error = %err, "failed to run function");
                    report.load_failures.push(err);
                }
                UnitOutcome::Failed(err) => {
                    if handlers.is_empty() {
                        error!(error = %err, "listener failed with no error handler registered");
                        if unhandled.is_none() {
                            unhandled = Some(err);
                        }
                    } else {
                        for handler in handlers.iter() {
                            handler(payload.as_ref(), &err);
                        }
                        report.handled_errors += 1;
                    }
                }
            }
        }

        match unhandled {
            Some(err) => Err(SplitscriptError::Handler(err)),
            None => Ok(report),
        }
    }

    /// Fire-and-forget variant of [`send`](Self::send).
    pub fn emit(
        &self,
        package_id: &str,
        event: Vec<String>,
        payload: Value,
    ) -> JoinHandle<Result<DispatchReport>> {
        let router = self.clone();
        let package_id = package_id.to_string();
        tokio::spawn(async move { router.send(&package_id, &event, payload).await })
    }

    /// List listeners of a package.
    ///
    /// Without `event` the package folder is searched recursively; with it,
    /// only the event folder itself. Returns `None` when the package folder
    /// does not exist, and `Some(vec![])` when it exists without listeners.
    pub fn listeners(
        &self,
        package_id: &str,
        event: Option<&[String]>,
    ) -> Result<Option<Vec<Listener>>> {
        let package_dir = self.ctx.package_dir(package_id);
        if !package_dir.is_dir() {
            return Ok(None);
        }

        let files = match event {
            Some(event) => compiled_units(&self.event_dir(package_id, event))?,
            None => compiled_units_recursive(&package_dir)?,
        };

        let listeners = files
            .into_iter()
            .map(|path| Listener {
                event: event_of(&package_dir, &path),
                path,
            })
            .collect();
        Ok(Some(listeners))
    }
}

async fn run_unit(loader: Arc<dyn HandlerLoader>, file: PathBuf, payload: Arc<Value>) -> UnitOutcome {
    let unit = match loader.load(&file).await {
        Ok(unit) => unit,
        Err(err) => return UnitOutcome::LoadFailed(err),
    };
    let invocable = match Invocable::resolve(unit) {
        Ok(invocable) => invocable,
        Err(diag) => return UnitOutcome::Shape(diag),
    };
    debug!(?invocable, "invoking listener");
    match invocable.invoke(Value::clone(&payload)).await {
        Ok(()) => UnitOutcome::Invoked,
        Err(err) => UnitOutcome::Failed(err),
    }
}

fn is_compiled_unit(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(COMPILED_EXTENSION)
}

/// Compiled units directly inside `dir`; a missing folder has none.
fn compiled_units(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if is_compiled_unit(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn compiled_units_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_compiled_unit(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Event segments of a unit: its folder relative to the package folder.
fn event_of(package_dir: &Path, path: &Path) -> Vec<String> {
    path.parent()
        .and_then(|dir| dir.strip_prefix(package_dir).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

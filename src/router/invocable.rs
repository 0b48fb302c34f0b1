// src/router/invocable.rs

//! Loaded handler units and their invocable shapes.
//!
//! A [`HandlerLoader`] turns a file into a [`LoadedUnit`], which exposes up to
//! two candidate entry points. [`Invocable::resolve`] picks one once, at load
//! time, preferring the default export. A unit exposing neither produces a
//! [`ShapeDiagnostic`] instead of an error.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'a>>;

/// Error raised by a handler unit.
#[derive(Error, Debug, Clone)]
pub enum HandlerError {
    #[error("listener {} failed to load: {message}", file.display())]
    Load { file: PathBuf, message: String },

    #[error("listener {} exited with status {status}: {stderr}", file.display())]
    Failed {
        file: PathBuf,
        status: i32,
        stderr: String,
    },

    #[error("listener {} threw: {message}", file.display())]
    Threw { file: PathBuf, message: String },
}

impl HandlerError {
    pub fn file(&self) -> &Path {
        match self {
            HandlerError::Load { file, .. }
            | HandlerError::Failed { file, .. }
            | HandlerError::Threw { file, .. } => file,
        }
    }
}

/// A unit that does not expose a supported entry point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeDiagnostic {
    #[error(
        "Listener {} does not export a function (export default for esm, module.exports = for cjs)",
        .0.display()
    )]
    NotCallable(PathBuf),
}

/// Something that can be invoked with an event payload.
pub trait Handler: Send + Sync {
    fn call(&self, payload: Value) -> HandlerFuture<'_>;
}

/// Adapter turning an async closure into a [`Handler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, payload: Value) -> HandlerFuture<'_> {
        Box::pin((self.f)(payload))
    }
}

/// A handler file after loading, before its shape is resolved.
#[derive(Clone)]
pub struct LoadedUnit {
    pub path: PathBuf,
    pub default_export: Option<Arc<dyn Handler>>,
    pub module_value: Option<Arc<dyn Handler>>,
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedUnit")
            .field("path", &self.path)
            .field("default_export", &self.default_export.is_some())
            .field("module_value", &self.module_value.is_some())
            .finish()
    }
}

impl LoadedUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_export: None,
            module_value: None,
        }
    }

    pub fn with_default_export(mut self, handler: Arc<dyn Handler>) -> Self {
        self.default_export = Some(handler);
        self
    }

    pub fn with_module_value(mut self, handler: Arc<dyn Handler>) -> Self {
        self.module_value = Some(handler);
        self
    }
}

/// The entry point chosen for one loaded unit.
#[derive(Clone)]
pub enum Invocable {
    /// `export default function (...)`.
    DefaultExport { path: PathBuf, handler: Arc<dyn Handler> },
    /// `module.exports = function (...)`.
    Module { path: PathBuf, handler: Arc<dyn Handler> },
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocable::DefaultExport { path, .. } => {
                f.debug_tuple("DefaultExport").field(path).finish()
            }
            Invocable::Module { path, .. } => f.debug_tuple("Module").field(path).finish(),
        }
    }
}

impl Invocable {
    pub fn resolve(unit: LoadedUnit) -> Result<Self, ShapeDiagnostic> {
        match (unit.default_export, unit.module_value) {
            (Some(handler), _) => Ok(Invocable::DefaultExport {
                path: unit.path,
                handler,
            }),
            (None, Some(handler)) => Ok(Invocable::Module {
                path: unit.path,
                handler,
            }),
            (None, None) => Err(ShapeDiagnostic::NotCallable(unit.path)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Invocable::DefaultExport { path, .. } | Invocable::Module { path, .. } => path,
        }
    }

    pub async fn invoke(&self, payload: Value) -> Result<(), HandlerError> {
        match self {
            Invocable::DefaultExport { handler, .. } | Invocable::Module { handler, .. } => {
                handler.call(payload).await
            }
        }
    }
}

/// Loads handler units from disk.
///
/// Called once per file per dispatch; implementations must not cache units
/// across dispatches.
pub trait HandlerLoader: Send + Sync {
    fn load<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<LoadedUnit, HandlerError>> + Send + 'a>>;
}

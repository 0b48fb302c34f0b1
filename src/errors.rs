// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::router::HandlerError;

#[derive(Error, Debug)]
pub enum SplitscriptError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed {}: {source}", path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot have duplicate event emitters ({0})")]
    DuplicatePackage(String),

    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Could not find {}", .0.display())]
    MissingEntryPoint(PathBuf),

    #[error("Supervised process crashed: {0}")]
    ProcessCrashed(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("{0} file(s) failed to build")]
    BuildFailed(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SplitscriptError>;

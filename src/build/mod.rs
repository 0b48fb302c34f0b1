// src/build/mod.rs

//! Per-file compilation into a mirrored output tree.
//!
//! `<project>/a/b/c.ts` compiles to `<output>/a/b/c.js`; JavaScript sources
//! keep their extension. Outputs are always overwritten and every file is
//! compiled independently: one failure never stops its siblings.

pub mod compiler;
pub mod filter;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

pub use compiler::{CommandCompiler, Compiler, CopyCompiler, compiler_from_settings};
pub use filter::SourceFilter;

/// Extension of compiled output.
pub const OUTPUT_EXTENSION: &str = "js";
/// Extension of statically-typed sources, renamed on output.
pub const TYPED_EXTENSION: &str = "ts";

/// A single file failed to compile.
#[derive(Error, Debug)]
#[error("Failed to build {}: {reason}", file.display())]
pub struct CompileError {
    pub file: PathBuf,
    pub elapsed: Duration,
    pub reason: String,
}

/// Outcome of compiling several files.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<CompileError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Mirror `source` (relative to `project_root`) under `output_root`.
///
/// Sources outside `project_root` land directly in `output_root`.
pub fn output_path(source: &Path, project_root: &Path, output_root: &Path) -> PathBuf {
    let rel = source
        .strip_prefix(project_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
    let out = output_root.join(rel);
    if out.extension().and_then(|e| e.to_str()) == Some(TYPED_EXTENSION) {
        out.with_extension(OUTPUT_EXTENSION)
    } else {
        out
    }
}

#[derive(Clone)]
pub struct BuildPipeline {
    project_root: PathBuf,
    output_root: PathBuf,
    compiler: Arc<dyn Compiler>,
    filter: SourceFilter,
}

impl std::fmt::Debug for BuildPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildPipeline")
            .field("project_root", &self.project_root)
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

impl BuildPipeline {
    pub fn new(
        project_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        compiler: Arc<dyn Compiler>,
    ) -> Self {
        let output_root = output_root.into();
        Self {
            project_root: project_root.into(),
            filter: SourceFilter::new(output_root.clone()),
            output_root,
            compiler,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    pub fn output_for(&self, source: &Path) -> PathBuf {
        output_path(source, &self.project_root, &self.output_root)
    }

    /// Compile one file, overwriting its output.
    ///
    /// The elapsed time is returned on success and carried by the error on
    /// failure; both outcomes are logged.
    pub async fn compile_one(&self, source: &Path) -> Result<Duration, CompileError> {
        let start = Instant::now();
        let output = self.output_for(source);
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = async {
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            self.compiler.compile(source, &output).await
        }
        .await;

        let elapsed = start.elapsed();
        let elapsed_ms = format!("{:.3} ms", elapsed.as_secs_f64() * 1000.0);
        match result {
            Ok(()) => {
                info!(file = %name, elapsed = %elapsed_ms, "BUILD");
                Ok(elapsed)
            }
            Err(err) => {
                let err = CompileError {
                    file: source.to_path_buf(),
                    elapsed,
                    reason: format!("{err:#}"),
                };
                error!(file = %name, elapsed = %elapsed_ms, error = %err.reason, "Failed to build");
                Err(err)
            }
        }
    }

    /// Compile every file concurrently and wait for all of them.
    pub async fn compile_batch(&self, files: Vec<PathBuf>) -> BatchReport {
        let mut set = JoinSet::new();
        for file in files {
            let pipeline = self.clone();
            set.spawn(async move {
                let outcome = pipeline.compile_one(&file).await;
                (file, outcome)
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((file, Ok(_))) => report.succeeded.push(file),
                Ok((_, Err(err))) => report.failed.push(err),
                Err(join_err) => error!(error = %join_err, "compile task panicked"),
            }
        }
        report.succeeded.sort();
        report
    }

    /// Every eligible source under the project root.
    pub fn discover_sources(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![self.project_root.clone()];

        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if self.filter.is_ignored(&path) {
                    continue;
                }
                if path.is_dir() {
                    stack.push(path);
                } else if self.filter.is_eligible(&path) {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Remove the whole output tree, if present.
    pub async fn clear_output(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.output_root).await {
            Ok(()) => {
                debug!(dir = %self.output_root.display(), "cleared output directory");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Delete the output mirrored from `source`; `None` if there was none.
    pub async fn remove_output(&self, source: &Path) -> std::io::Result<Option<PathBuf>> {
        let output = self.output_for(source);
        match tokio::fs::remove_file(&output).await {
            Ok(()) => Ok(Some(output)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Discover, clear and compile everything.
    pub async fn build_all(&self) -> std::io::Result<BatchReport> {
        let files = self.discover_sources()?;
        self.clear_output().await?;
        info!(files = files.len(), out = %self.output_root.display(), "building");
        Ok(self.compile_batch(files).await)
    }
}

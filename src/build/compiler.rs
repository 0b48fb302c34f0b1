// src/build/compiler.rs

//! Pluggable single-file compilers.
//!
//! The pipeline only needs "turn this source into that output file". The
//! production implementation shells out to a configurable command (esbuild by
//! default); [`CopyCompiler`] is an identity transform.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::debug;

use crate::config::ProjectSettings;

pub type CompileFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait abstracting the per-file source transform.
pub trait Compiler: Send + Sync {
    /// Compile `source` into `output`, overwriting it. The parent folder of
    /// `output` already exists.
    fn compile<'a>(&'a self, source: &'a Path, output: &'a Path) -> CompileFuture<'a>;
}

/// Copies sources unchanged.
#[derive(Debug, Clone, Default)]
pub struct CopyCompiler;

impl Compiler for CopyCompiler {
    fn compile<'a>(&'a self, source: &'a Path, output: &'a Path) -> CompileFuture<'a> {
        Box::pin(async move {
            tokio::fs::copy(source, output)
                .await
                .with_context(|| format!("copying {:?} to {:?}", source, output))?;
            Ok(())
        })
    }
}

/// Runs an argv template where `{input}` and `{output}` are substituted.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    argv: Vec<String>,
}

impl CommandCompiler {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// `esbuild <input> --outfile=<output> --log-level=error --target=esnext`.
    pub fn esbuild() -> Self {
        Self::new(
            ["esbuild", "{input}", "--outfile={output}", "--log-level=error", "--target=esnext"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }

    fn expand(&self, source: &Path, output: &Path) -> Vec<String> {
        let input = source.to_string_lossy();
        let out = output.to_string_lossy();
        self.argv
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{output}", &out))
            .collect()
    }
}

impl Compiler for CommandCompiler {
    fn compile<'a>(&'a self, source: &'a Path, output: &'a Path) -> CompileFuture<'a> {
        Box::pin(async move {
            let argv = self.expand(source, output);
            let Some((program, args)) = argv.split_first() else {
                bail!("compiler command is empty");
            };
            debug!(%program, ?args, "running compiler");

            let result = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .with_context(|| format!("spawning compiler '{program}'"))?;

            if !result.status.success() {
                let stderr = String::from_utf8_lossy(&result.stderr);
                bail!(
                    "compiler exited with status {}: {}",
                    result.status.code().unwrap_or(-1),
                    stderr.trim()
                );
            }
            Ok(())
        })
    }
}

/// Compiler selected by the `compiler` setting.
pub fn compiler_from_settings(settings: &ProjectSettings) -> Arc<dyn Compiler> {
    match &settings.compiler {
        None => Arc::new(CommandCompiler::esbuild()),
        Some(argv) if argv.is_empty() => Arc::new(CopyCompiler),
        Some(argv) => Arc::new(CommandCompiler::new(argv.clone())),
    }
}

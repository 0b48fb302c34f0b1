// src/router/loader.rs

//! Production handler loader: compiled JavaScript run through a runner.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::invocable::{Handler, HandlerError, HandlerFuture, HandlerLoader, LoadedUnit};

/// Environment variable naming the unit the bootstrap should import.
pub const HANDLER_PATH_ENV: &str = "SPLITSCRIPT_HANDLER";
/// Environment variable naming the export shape (`default` or `module`).
pub const HANDLER_EXPORT_ENV: &str = "SPLITSCRIPT_EXPORT";

/// Bootstrap evaluated by the runner: reads the payload from stdin, imports
/// the unit and calls the selected export. A rejected promise exits non-zero.
const BOOTSTRAP: &str = r#"
const { pathToFileURL } = require('node:url');
let input = '';
process.stdin.setEncoding('utf8');
process.stdin.on('data', (chunk) => { input += chunk; });
process.stdin.on('end', async () => {
  const payload = JSON.parse(input || '{}');
  const file = process.env.SPLITSCRIPT_HANDLER;
  const fn = process.env.SPLITSCRIPT_EXPORT === 'module'
    ? require(file)
    : (await import(pathToFileURL(file).href)).default;
  await fn(payload);
});
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportShape {
    Default,
    Module,
}

impl ExportShape {
    fn as_str(self) -> &'static str {
        match self {
            ExportShape::Default => "default",
            ExportShape::Module => "module",
        }
    }
}

/// Loads units by reading their text and sniffing the export shape.
///
/// - `export default` ⇒ default export.
/// - `module.exports` or `exports.default` ⇒ whole-module callable.
#[derive(Debug, Clone)]
pub struct ProcessLoader {
    runner: String,
}

impl ProcessLoader {
    pub fn new(runner: impl Into<String>) -> Self {
        Self {
            runner: runner.into(),
        }
    }
}

impl Default for ProcessLoader {
    fn default() -> Self {
        Self::new(crate::config::model::DEFAULT_RUNNER)
    }
}

impl HandlerLoader for ProcessLoader {
    fn load<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<LoadedUnit, HandlerError>> + Send + 'a>> {
        Box::pin(async move {
            let source = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| HandlerError::Load {
                    file: path.to_path_buf(),
                    message: e.to_string(),
                })?;

            let mut unit = LoadedUnit::new(path);
            if source.contains("export default") {
                unit = unit.with_default_export(self.handler(path, ExportShape::Default));
            }
            if source.contains("module.exports") || source.contains("exports.default") {
                unit = unit.with_module_value(self.handler(path, ExportShape::Module));
            }
            debug!(
                file = %path.display(),
                default_export = unit.default_export.is_some(),
                module_value = unit.module_value.is_some(),
                "loaded listener"
            );
            Ok(unit)
        })
    }
}

impl ProcessLoader {
    fn handler(&self, path: &Path, shape: ExportShape) -> Arc<dyn Handler> {
        Arc::new(ScriptHandler {
            runner: self.runner.clone(),
            path: path.to_path_buf(),
            shape,
        })
    }
}

struct ScriptHandler {
    runner: String,
    path: PathBuf,
    shape: ExportShape,
}

impl Handler for ScriptHandler {
    fn call(&self, payload: Value) -> HandlerFuture<'_> {
        Box::pin(async move {
            let failed_to_start = |e: std::io::Error| HandlerError::Load {
                file: self.path.clone(),
                message: format!("running '{}': {e}", self.runner),
            };

            let mut child = Command::new(&self.runner)
                .arg("-e")
                .arg(BOOTSTRAP)
                .env(HANDLER_PATH_ENV, &self.path)
                .env(HANDLER_EXPORT_ENV, self.shape.as_str())
                .stdin(Stdio::piped())
                .stdout(Stdio::inherit())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(failed_to_start)?;

            if let Some(mut stdin) = child.stdin.take() {
                let body = payload.to_string();
                stdin
                    .write_all(body.as_bytes())
                    .await
                    .map_err(failed_to_start)?;
                // Dropping stdin closes the pipe so the bootstrap sees `end`.
            }

            let output = child.wait_with_output().await.map_err(failed_to_start)?;
            if output.status.success() {
                return Ok(());
            }

            Err(HandlerError::Failed {
                file: self.path.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        })
    }
}

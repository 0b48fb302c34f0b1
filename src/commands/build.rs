// src/commands/build.rs

use std::path::Path;

use tracing::info;

use crate::build::{BatchReport, BuildPipeline, compiler_from_settings};
use crate::config;
use crate::errors::{Result, SplitscriptError};

/// Build `folder` for production into its `build` directory.
///
/// Every file is attempted; the command fails afterwards when any did.
pub async fn build(folder: &Path) -> Result<BatchReport> {
    if !folder.exists() {
        return Err(SplitscriptError::ConfigError(format!(
            "Could not find {}",
            folder.display()
        )));
    }
    if !folder.is_dir() {
        return Err(SplitscriptError::ConfigError(
            "Path must be a folder".to_string(),
        ));
    }
    let folder = folder.canonicalize()?;

    let file = config::load(&folder)?;
    let output_root = folder.join(file.settings.build_dir());
    let pipeline = BuildPipeline::new(&folder, output_root, compiler_from_settings(&file.settings));

    let report = pipeline.build_all().await?;
    info!(
        built = report.succeeded.len(),
        failed = report.failed.len(),
        "build finished"
    );
    if !report.is_success() {
        return Err(SplitscriptError::BuildFailed(report.failed.len()));
    }
    Ok(report)
}

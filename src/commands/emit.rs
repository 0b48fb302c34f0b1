// src/commands/emit.rs

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::load;
use crate::context::ProjectContext;
use crate::errors::{Result, SplitscriptError};
use crate::pattern::split_event;
use crate::router::{DispatchReport, EventRouter, ProcessLoader};

/// Send `data` (JSON) to the listeners of `event`.
///
/// Listeners are looked up under `cwd` unless `ROOT` points elsewhere, so
/// the command also works against a dev output tree.
pub async fn emit(cwd: &Path, package: &str, event: &str, data: &str) -> Result<DispatchReport> {
    let payload: Value = serde_json::from_str(data)?;

    let ctx = match std::env::var_os(crate::context::ROOT_ENV) {
        Some(_) => ProjectContext::from_env(),
        None => ProjectContext::new(cwd),
    };
    let settings = load(ctx.config_location())?.settings;
    let router = EventRouter::new(Arc::new(ctx), Arc::new(ProcessLoader::new(settings.runner())));

    let segments = split_event(event);
    if segments.is_empty() {
        return Err(SplitscriptError::ConfigError("event name is empty".to_string()));
    }
    let report = router.send(package, &segments, payload).await?;
    println!(
        "{} listener(s) invoked, {} skipped",
        report.invoked,
        report.diagnostics.len() + report.load_failures.len()
    );
    Ok(report)
}

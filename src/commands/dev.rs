// src/commands/dev.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::build::{BuildPipeline, SourceFilter, compiler_from_settings};
use crate::config::{self, ConfigStore};
use crate::context::ProjectContext;
use crate::dev::{DevEvent, DevSupervisor, RealProcessBackend, run_scaffold_loop};
use crate::errors::{Result, SplitscriptError};
use crate::watch::{WatchEvent, WatcherHandle, spawn_watcher};

/// Capacity of the dev event channel.
const EVENT_BUFFER: usize = 256;

/// Where the dev loop runs from and what it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevTarget {
    pub project_root: PathBuf,
    pub entry_source: PathBuf,
}

/// Resolve the `dev` argument.
///
/// A folder runs its configured (or default) `main`; a file runs itself from
/// its parent folder. Either must exist.
pub fn resolve_target(cwd: &Path, target: &Path) -> Result<DevTarget> {
    let target = cwd.join(target);
    if !target.exists() {
        return Err(SplitscriptError::MissingEntryPoint(target));
    }
    let target = target.canonicalize()?;

    if target.is_dir() {
        let settings = config::load(&target)?.settings;
        let typed = config::is_typed(&target, &settings);
        let entry_source = target.join(settings.main_or_default(typed));
        if !entry_source.is_file() {
            return Err(SplitscriptError::MissingEntryPoint(entry_source));
        }
        return Ok(DevTarget {
            project_root: target,
            entry_source,
        });
    }

    let project_root = target
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| SplitscriptError::MissingEntryPoint(target.clone()))?;
    Ok(DevTarget {
        project_root,
        entry_source: target,
    })
}

/// Developer mode.
///
/// With a target: build everything, run the entry point and restart it on
/// every change, filling new listener files along the way. Without a target:
/// only fill new listener files under `cwd`.
pub async fn dev(cwd: &Path, target: Option<&Path>) -> Result<()> {
    let (tx, rx) = mpsc::channel::<DevEvent>(EVENT_BUFFER);
    spawn_ctrl_c(tx.clone());

    let Some(target) = target else {
        let functions = cwd.join(crate::FUNCTIONS_DIR);
        tokio::fs::create_dir_all(&functions).await?;
        let _watcher = watch_into(&functions, |_| false, tx)?;
        let store = ConfigStore::new(Arc::new(ProjectContext::new(cwd.canonicalize()?)));
        return run_scaffold_loop(store, rx).await;
    };

    let DevTarget {
        project_root,
        entry_source,
    } = resolve_target(cwd, target)?;
    let file = config::load(&project_root)?;
    let variant = config::detect_variant(&project_root, &file.settings)?;
    info!(variant = %variant.label(), root = %project_root.display(), "Now in dev mode");

    let output_root = project_root.join(file.settings.dev_dir());
    let pipeline = BuildPipeline::new(
        &project_root,
        output_root,
        compiler_from_settings(&file.settings),
    );

    let filter = pipeline.filter().clone();
    let _watcher = watch_into(
        &project_root,
        move |path| filter.is_ignored(path) || SourceFilter::is_manifest(path),
        tx.clone(),
    )?;

    let store = ConfigStore::new(Arc::new(ProjectContext::new(&project_root)));
    let backend = RealProcessBackend::new(tx);
    DevSupervisor::new(pipeline, backend, rx, entry_source, file.settings.runner())
        .with_scaffold(store)
        .run()
        .await
}

/// Start a watcher on `root` whose events feed the dev channel.
fn watch_into<F>(root: &Path, ignore: F, tx: mpsc::Sender<DevEvent>) -> Result<WatcherHandle>
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let (watch_tx, mut watch_rx) = mpsc::channel::<WatchEvent>(EVENT_BUFFER);
    let handle = spawn_watcher(root, ignore, watch_tx)?;

    tokio::spawn(async move {
        while let Some(event) = watch_rx.recv().await {
            if tx.send(DevEvent::from(event)).await.is_err() {
                debug!("dev loop gone; dropping watch events");
                break;
            }
        }
    });
    Ok(handle)
}

fn spawn_ctrl_c(tx: mpsc::Sender<DevEvent>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl-C; shutting down");
                let _ = tx.send(DevEvent::Shutdown).await;
            }
            Err(err) => warn!(error = %err, "failed to listen for Ctrl-C"),
        }
    });
}

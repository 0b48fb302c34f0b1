// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::path_utils::rebase;

/// A filesystem change, as seen by the dev supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchEvent {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Added(p) | WatchEvent::Changed(p) | WatchEvent::Removed(p) => p,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WatchEvent::Added(_) => "add",
            WatchEvent::Changed(_) => "change",
            WatchEvent::Removed(_) => "unlink",
        }
    }
}

/// Translate one notify event into zero or more [`WatchEvent`]s.
///
/// Access and metadata-only events are dropped. Renames become a removal of
/// the old name and an addition of the new one.
pub fn classify(event: &Event) -> Vec<WatchEvent> {
    let paths = &event.paths;
    match event.kind {
        EventKind::Create(_) => paths.iter().cloned().map(WatchEvent::Added).collect(),
        EventKind::Remove(_) => paths.iter().cloned().map(WatchEvent::Removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.iter().cloned().map(WatchEvent::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.iter().cloned().map(WatchEvent::Added).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => match paths.as_slice() {
            [from, to] => vec![
                WatchEvent::Removed(from.clone()),
                WatchEvent::Added(to.clone()),
            ],
            _ => Vec::new(),
        },
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .iter()
            .map(|p| {
                if p.exists() {
                    WatchEvent::Added(p.clone())
                } else {
                    WatchEvent::Removed(p.clone())
                }
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => paths
            .iter()
            .filter(|p| p.is_file())
            .cloned()
            .map(WatchEvent::Changed)
            .collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    root: PathBuf,
}

impl WatcherHandle {
    /// Canonical root being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Watch `root` recursively and forward [`WatchEvent`]s to `tx` in arrival
/// order.
///
/// Paths for which `ignore` returns `true` are dropped before they reach the
/// channel. Event paths are expressed under the canonical `root`.
pub fn spawn_watcher<F>(
    root: impl Into<PathBuf>,
    ignore: F,
    tx: mpsc::Sender<WatchEvent>,
) -> Result<WatcherHandle>
where
    F: Fn(&Path) -> bool + Send + Sync + 'static,
{
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let ignore = Arc::new(ignore);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("splitscript: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("splitscript: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), "file watcher started");

    let async_root = root.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            trace!(?event, "received notify event");

            for change in classify(&event) {
                let Some(path) = rebase(&async_root, change.path()) else {
                    continue;
                };
                if ignore(&path) {
                    continue;
                }
                let change = match change {
                    WatchEvent::Added(_) => WatchEvent::Added(path),
                    WatchEvent::Changed(_) => WatchEvent::Changed(path),
                    WatchEvent::Removed(_) => WatchEvent::Removed(path),
                };
                debug!(kind = change.label(), path = %change.path().display(), "file event");
                if tx.send(change).await.is_err() {
                    debug!("watch receiver dropped; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        root,
    })
}

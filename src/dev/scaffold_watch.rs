// src/dev/scaffold_watch.rs

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::DevEvent;
use crate::config::ConfigStore;
use crate::errors::{Result, SplitscriptError};
use crate::scaffold;
use crate::watch::WatchEvent;

/// Fill new empty handler files until shutdown, without building or running
/// anything.
pub async fn run_scaffold_loop(store: ConfigStore, mut events: mpsc::Receiver<DevEvent>) -> Result<()> {
    info!(root = %store.context().root().display(), "watching functions for new listeners");

    while let Some(event) = events.recv().await {
        match event {
            DevEvent::File(WatchEvent::Added(path)) => match scaffold::fill_new_handler(&store, &path) {
                Ok(filled) => debug!(path = %path.display(), filled, "new file"),
                Err(err @ SplitscriptError::MalformedConfig { .. }) => return Err(err),
                Err(err) => warn!(path = %path.display(), error = %err, "failed to fill new listener"),
            },
            DevEvent::Shutdown => break,
            _ => {}
        }
    }
    Ok(())
}

// src/dev/supervisor.rs

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::process::{LaunchSpec, ProcessBackend};
use super::{DevEvent, DevState};
use crate::build::BuildPipeline;
use crate::config::ConfigStore;
use crate::errors::{Result, SplitscriptError};
use crate::scaffold;
use crate::watch::WatchEvent;

/// Keeps exactly one live process of the compiled entry point and rebuilds
/// and restarts it on every relevant change.
pub struct DevSupervisor<B: ProcessBackend> {
    pipeline: BuildPipeline,
    backend: B,
    events: mpsc::Receiver<DevEvent>,
    entry_source: PathBuf,
    runner: String,
    /// Fills new empty handler files when set.
    scaffold: Option<ConfigStore>,
    generation: u64,
    state: DevState,
    /// Non-file events received while coalescing a rebuild.
    backlog: Vec<DevEvent>,
}

impl<B: ProcessBackend> std::fmt::Debug for DevSupervisor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevSupervisor")
            .field("entry_source", &self.entry_source)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> DevSupervisor<B> {
    pub fn new(
        pipeline: BuildPipeline,
        backend: B,
        events: mpsc::Receiver<DevEvent>,
        entry_source: impl Into<PathBuf>,
        runner: impl Into<String>,
    ) -> Self {
        Self {
            pipeline,
            backend,
            events,
            entry_source: entry_source.into(),
            runner: runner.into(),
            scaffold: None,
            generation: 0,
            state: DevState::Idle,
            backlog: Vec::new(),
        }
    }

    /// Also fill newly created empty handler files with boilerplate.
    pub fn with_scaffold(mut self, store: ConfigStore) -> Self {
        self.scaffold = Some(store);
        self
    }

    fn set_state(&mut self, state: DevState) {
        debug!(from = ?self.state, to = ?state, "dev state");
        self.state = state;
    }

    /// Main loop. Returns when the event channel closes or a shutdown is
    /// requested; fails when the current generation writes to stderr.
    pub async fn run(mut self) -> Result<()> {
        self.set_state(DevState::InitialBuild);
        let report = self.pipeline.build_all().await?;
        if !report.is_success() {
            warn!(failed = report.failed.len(), "initial build finished with failures");
        }
        self.restart().await?;

        loop {
            let event = if self.backlog.is_empty() {
                match self.events.recv().await {
                    Some(event) => event,
                    None => {
                        info!("dev event channel closed; exiting");
                        break;
                    }
                }
            } else {
                self.backlog.remove(0)
            };

            match event {
                DevEvent::Shutdown => {
                    info!("shutdown requested");
                    break;
                }
                DevEvent::Crashed { generation, line } => {
                    if generation != self.generation {
                        debug!(generation, current = self.generation, "ignoring output of stale process");
                        continue;
                    }
                    return self.crash(generation, line).await;
                }
                DevEvent::File(change) => self.rebuild(change).await?,
            }
        }

        self.shutdown().await
    }

    /// Apply `first` and every file event already queued, then restart once.
    ///
    /// Stderr output of the live generation found while draining ends the
    /// session instead of being carried past the restart.
    async fn rebuild(&mut self, first: WatchEvent) -> Result<()> {
        self.set_state(DevState::Rebuilding);
        let mut restart = self.apply(first).await?;

        while let Ok(next) = self.events.try_recv() {
            match next {
                DevEvent::File(change) => restart |= self.apply(change).await?,
                DevEvent::Crashed { generation, line } if generation == self.generation => {
                    return self.crash(generation, line).await;
                }
                DevEvent::Crashed { generation, .. } => {
                    debug!(generation, current = self.generation, "ignoring output of stale process");
                }
                DevEvent::Shutdown => self.backlog.push(DevEvent::Shutdown),
            }
        }

        if restart {
            self.restart().await?;
        } else {
            self.set_state(DevState::Running);
        }
        Ok(())
    }

    /// Handle one change; `true` when the process must restart.
    async fn apply(&mut self, change: WatchEvent) -> Result<bool> {
        let filter = self.pipeline.filter();
        match change {
            WatchEvent::Added(path) | WatchEvent::Changed(path)
                if filter.is_eligible(&path) =>
            {
                self.fill_if_new(&path)?;
                // Compile failures are already logged; the previous output stays.
                let _ = self.pipeline.compile_one(&path).await;
                Ok(true)
            }
            WatchEvent::Removed(path) if filter.is_eligible(&path) => {
                let output = self.pipeline.output_for(&path);
                if !output.exists() {
                    return Ok(false);
                }
                info!(file = %display_name(&path), "DELETE");
                self.pipeline.remove_output(&path).await?;
                // Nothing left to run until the entry point comes back.
                Ok(!self.is_entry(&path))
            }
            other => {
                debug!(path = %other.path().display(), "ignoring change");
                Ok(false)
            }
        }
    }

    fn fill_if_new(&self, path: &Path) -> Result<()> {
        let Some(store) = &self.scaffold else {
            return Ok(());
        };
        match scaffold::fill_new_handler(store, path) {
            Ok(_) => Ok(()),
            Err(err @ SplitscriptError::MalformedConfig { .. }) => Err(err),
            Err(err) => {
                warn!(file = %display_name(path), error = %err, "failed to fill new listener");
                Ok(())
            }
        }
    }

    fn is_entry(&self, path: &Path) -> bool {
        self.pipeline.output_for(path) == self.pipeline.output_for(&self.entry_source)
    }

    /// Stop the live generation, then start the next one.
    async fn restart(&mut self) -> Result<()> {
        self.backend.stop().await?;
        self.generation += 1;

        let entry = self.pipeline.output_for(&self.entry_source);
        if !entry.exists() {
            error!(entry = %self.entry_source.display(), "Could not find entry point output");
            self.set_state(DevState::Running);
            return Ok(());
        }

        let spec = LaunchSpec::for_entry(
            &self.runner,
            &entry,
            self.pipeline.output_root(),
            self.pipeline.project_root(),
        );
        let pid = self.backend.start(self.generation, spec).await?;
        debug!(pid, generation = self.generation, "supervised process running");
        self.set_state(DevState::Running);
        Ok(())
    }

    async fn crash(&mut self, generation: u64, line: String) -> Result<()> {
        error!(generation, "supervised process wrote to stderr");
        self.shutdown().await?;
        Err(SplitscriptError::ProcessCrashed(line))
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.backend.stop().await?;
        self.set_state(DevState::Stopped);
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// src/dev/process.rs

//! Lifecycle of the supervised entry-point process.
//!
//! The supervisor talks to a [`ProcessBackend`] instead of spawning processes
//! itself, so tests can record start/stop calls without running anything.
//! [`RealProcessBackend`] is the production implementation.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use chrono::Local;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::DevEvent;
use crate::context::{CONFIG_LOCATION_ENV, ROOT_ENV};

pub type ProcessFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Timestamp prefix of supervised output lines, e.g. `3/7/25 9:05`.
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%y %-H:%M";

/// What to run for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    /// Run the compiled entry point with `runner`, exposing the output root
    /// as `ROOT` and the project root as `CONFIG_LOCATION`.
    pub fn for_entry(runner: &str, entry: &Path, output_root: &Path, project_root: &Path) -> Self {
        Self {
            program: runner.to_string(),
            args: vec![entry.to_string_lossy().into_owned()],
            env: vec![
                (ROOT_ENV.to_string(), output_root.to_string_lossy().into_owned()),
                (
                    CONFIG_LOCATION_ENV.to_string(),
                    project_root.to_string_lossy().into_owned(),
                ),
            ],
        }
    }
}

/// Trait abstracting how the supervised process is started and stopped.
pub trait ProcessBackend: Send {
    /// Start generation `generation`, returning its pid.
    ///
    /// Implementations must not leave a previous generation running.
    fn start(&mut self, generation: u64, spec: LaunchSpec) -> ProcessFuture<'_, u32>;

    /// Kill the live process and its descendants and wait for it to exit.
    /// A no-op when nothing is running.
    fn stop(&mut self) -> ProcessFuture<'_, ()>;

    fn is_running(&self) -> bool;
}

struct LiveProcess {
    child: Child,
    pid: u32,
    generation: u64,
    readers: Vec<JoinHandle<()>>,
}

/// Production backend spawning real OS processes.
///
/// Stdout lines are echoed with a `PRINT` prefix. Stderr lines are echoed
/// with a `CRASH` prefix and reported to the supervisor as
/// [`DevEvent::Crashed`].
pub struct RealProcessBackend {
    events: mpsc::Sender<DevEvent>,
    live: Option<LiveProcess>,
    /// Pids spawned by earlier generations whose descendants may still live.
    roster: Vec<u32>,
}

impl std::fmt::Debug for RealProcessBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealProcessBackend")
            .field("live_pid", &self.live.as_ref().map(|l| l.pid))
            .field("roster", &self.roster)
            .finish_non_exhaustive()
    }
}

impl RealProcessBackend {
    pub fn new(events: mpsc::Sender<DevEvent>) -> Self {
        Self {
            events,
            live: None,
            roster: Vec::new(),
        }
    }

    async fn start_inner(&mut self, generation: u64, spec: LaunchSpec) -> Result<u32> {
        self.stop_inner().await?;

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning '{}'", spec.program))?;

        let pid = child
            .id()
            .context("supervised process exited before its pid was read")?;

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(stream_stdout(stdout)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(stream_stderr(
                stderr,
                generation,
                self.events.clone(),
            )));
        }

        let entry = spec.args.last().map(PathBuf::from).unwrap_or_default();
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(pid, generation, entry = %name, "START");

        self.roster.push(pid);
        self.live = Some(LiveProcess {
            child,
            pid,
            generation,
            readers,
        });
        Ok(pid)
    }

    async fn stop_inner(&mut self) -> Result<()> {
        let Some(mut live) = self.live.take() else {
            self.roster.clear();
            return Ok(());
        };

        let mut roots = self.roster.clone();
        if !roots.contains(&live.pid) {
            roots.push(live.pid);
        }
        let killed = {
            // Collect before killing: orphans get re-parented once their parent dies.
            let tree = ProcessTree::collect(&roots);
            if let Err(err) = live.child.start_kill() {
                debug!(pid = live.pid, error = %err, "process already exited");
            }
            tree.kill()
        };

        let status = live
            .child
            .wait()
            .await
            .with_context(|| format!("waiting for process {}", live.pid))?;
        for reader in live.readers {
            reader.abort();
        }
        self.roster.clear();

        debug!(
            pid = live.pid,
            generation = live.generation,
            descendants = killed,
            exit_code = status.code().unwrap_or(-1),
            "stopped supervised process"
        );
        Ok(())
    }
}

impl ProcessBackend for RealProcessBackend {
    fn start(&mut self, generation: u64, spec: LaunchSpec) -> ProcessFuture<'_, u32> {
        Box::pin(self.start_inner(generation, spec))
    }

    fn stop(&mut self) -> ProcessFuture<'_, ()> {
        Box::pin(self.stop_inner())
    }

    fn is_running(&self) -> bool {
        self.live.is_some()
    }
}

/// Descendants of a set of root processes, captured at one instant.
pub struct ProcessTree {
    system: System,
    pids: Vec<Pid>,
}

impl ProcessTree {
    /// Every transitive child of `roots` (the roots themselves excluded).
    pub fn collect(roots: &[u32]) -> Self {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut seen: HashSet<Pid> = roots.iter().copied().map(Pid::from_u32).collect();
        let mut frontier: Vec<Pid> = seen.iter().copied().collect();
        let mut pids = Vec::new();

        while let Some(parent) = frontier.pop() {
            for (pid, process) in system.processes() {
                if process.parent() == Some(parent) && seen.insert(*pid) {
                    pids.push(*pid);
                    frontier.push(*pid);
                }
            }
        }

        Self { system, pids }
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.iter().map(|p| p.as_u32()).collect()
    }

    /// Kill every collected process; returns how many signals were delivered.
    pub fn kill(&self) -> usize {
        self.pids
            .iter()
            .filter_map(|pid| self.system.process(*pid))
            .filter(|process| {
                let delivered = process.kill();
                if !delivered {
                    warn!(pid = process.pid().as_u32(), "failed to kill descendant process");
                }
                delivered
            })
            .count()
    }
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

async fn stream_stdout<R: AsyncRead + Unpin>(stdout: R) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        println!(" PRINT  {} {line}", timestamp());
    }
}

async fn stream_stderr<R: AsyncRead + Unpin>(
    stderr: R,
    generation: u64,
    events: mpsc::Sender<DevEvent>,
) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        eprintln!(" CRASH  {} {line}", timestamp());
        if events
            .send(DevEvent::Crashed { generation, line })
            .await
            .is_err()
        {
            return;
        }
    }
}

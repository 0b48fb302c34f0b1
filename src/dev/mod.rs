// src/dev/mod.rs

//! Development mode: watch, rebuild, restart.
//!
//! Everything that can happen while developing arrives as a [`DevEvent`] on a
//! single channel and is handled by one [`DevSupervisor`] loop, so starting
//! and stopping the supervised process is never concurrent with itself.

pub mod process;
pub mod scaffold_watch;
pub mod supervisor;

use crate::watch::WatchEvent;

pub use process::{LaunchSpec, ProcessBackend, ProcessTree, RealProcessBackend};
pub use scaffold_watch::run_scaffold_loop;
pub use supervisor::DevSupervisor;

/// Input of the dev loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevEvent {
    /// A filesystem change under the project root.
    File(WatchEvent),
    /// A line on the supervised process's stderr.
    Crashed { generation: u64, line: String },
    /// Ctrl-C or an explicit stop request.
    Shutdown,
}

impl From<WatchEvent> for DevEvent {
    fn from(event: WatchEvent) -> Self {
        DevEvent::File(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevState {
    Idle,
    InitialBuild,
    Running,
    Rebuilding,
    Stopped,
}

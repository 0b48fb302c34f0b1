// src/watch/mod.rs

//! File watching.
//!
//! Wraps the cross-platform `notify` watcher and turns its raw events into a
//! stream of [`WatchEvent`]s. It does not know what a change means; the dev
//! supervisor decides whether to rebuild, restart or scaffold.

pub mod path_utils;
pub mod watcher;

pub use path_utils::relative_str;
pub use watcher::{WatchEvent, WatcherHandle, classify, spawn_watcher};

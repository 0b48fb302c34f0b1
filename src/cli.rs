// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `splitscript`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "splitscript",
    version,
    about = "Route events to handler files and develop with live rebuild-and-restart.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SPLITSCRIPT_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add an event listener.
    Add {
        /// Registered package id.
        package: String,
        /// Event to listen to, e.g. `message/create`.
        event: String,
    },

    /// Remove event listeners.
    ///
    /// Without an event, lists the events of the package that have listeners.
    Remove {
        /// Registered package id.
        package: String,
        /// Event folder, e.g. `message/create`.
        event: Option<String>,
        /// Listener file names to delete (e.g. `1.ts`).
        files: Vec<String>,
        /// Delete every listener of the event.
        #[arg(long)]
        all: bool,
    },

    /// Developer mode: build, run and restart on change.
    ///
    /// TARGET may be a project folder (its `main` is run) or a single file.
    /// Without a target only listener scaffolding is watched.
    Dev {
        target: Option<PathBuf>,
    },

    /// Build a project folder for production.
    Build {
        folder: PathBuf,
    },

    /// Send an event to its listeners.
    Emit {
        /// Registered package id.
        package: String,
        /// Event name, e.g. `message/create`.
        event: String,
        /// JSON payload passed to every listener.
        #[arg(long, value_name = "JSON", default_value = "{}")]
        data: String,
    },

    /// Print the listeners of a package (optionally of a single event) as JSON.
    Listeners {
        package: String,
        event: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

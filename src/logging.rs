// src/logging.rs

//! Logging for `splitscript`, built on `tracing-subscriber`'s `EnvFilter`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` on the command line
//! 2. `SPLITSCRIPT_LOG`, which accepts full filter directives
//!    (e.g. `debug` or `splitscript::dev=trace,info`)
//! 3. `info`
//!
//! Watcher backend chatter is capped at `warn` unless a directive names it.
//! Logs go to STDERR; the supervised process's own lines are printed by the
//! dev supervisor with their ` PRINT ` / ` CRASH ` prefixes.

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "SPLITSCRIPT_LOG";

const BACKEND_DIRECTIVE: &str = "notify=warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI level and the raw env value.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env_value.map(str::trim)) {
        (Some(level), _) => level.as_directive().to_string(),
        (None, Some(raw)) if !raw.is_empty() => raw.to_string(),
        _ => "info".to_string(),
    };

    let mut filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV} directives '{directives}'"))?;
    if !directives.contains("notify") {
        filter = filter.add_directive(
            BACKEND_DIRECTIVE
                .parse::<Directive>()
                .context("parsing backend log directive")?,
        );
    }
    Ok(filter)
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

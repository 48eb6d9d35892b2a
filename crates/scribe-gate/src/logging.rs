//! Structured logging setup using `tracing-subscriber` and `tracing-appender`.
//!
//! - **Dictation** ([`init_dictation`]): JSON file layer (daily rotation) + stderr
//! - **CLI** ([`init_cli`]): stderr only, for one-shot subcommands

use crate::{AppError, AppResult};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_FILTER: &str = "scribe_gate=info,scribe_gate_core=info";

/// Keeps the non-blocking file writer alive. Dropping it flushes the log.
pub(crate) struct LoggingGuard {
    _guard: WorkerGuard,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialise logging for the dictation tray.
///
/// Writes JSON logs to `{logs_dir}/scribe-gate.log.YYYY-MM-DD` and
/// human-readable output to stderr.
#[track_caller]
pub(crate) fn init_dictation(logs_dir: &Path) -> AppResult<LoggingGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "scribe-gate.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(LoggingGuard { _guard: guard })
}

/// Initialise stderr-only logging for the session subcommands.
#[track_caller]
pub(crate) fn init_cli() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

//! Tracing setup.
//!
//! The interactive UI owns the terminal, so it logs to a file; headless
//! commands log to stderr. `SLEEPTRACK_LOG` takes an `EnvFilter` directive,
//! `SLEEPTRACK_DEBUG_LOG=1` forces `debug`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SLEEPTRACK_LOG";
const DEBUG_ENV: &str = "SLEEPTRACK_DEBUG_LOG";
const LOG_FILE_NAME: &str = "sleeptrack.log";

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Append to `sleeptrack.log` inside this directory.
    File(PathBuf),
}

/// Keeps the background writer alive; drop it last to flush.
#[must_use = "dropping the guard stops the log writer"]
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

fn debug_forced() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

fn build_filter(default_directive: &str) -> EnvFilter {
    if debug_forced() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
    }
}

/// Installs the global subscriber.
///
/// Calling it twice is harmless: the second install is ignored.
pub fn init(target: LogTarget, default_directive: &str) -> Result<LogGuard> {
    let filter = build_filter(default_directive);

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
            Ok(LogGuard { _guard: None })
        }
        LogTarget::File(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Ok(LogGuard {
                _guard: Some(guard),
            })
        }
    }
}

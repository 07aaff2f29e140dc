// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging for the scheduler's own operational log, kept
//! distinct from any individual job's log file (see `shed_adapters::rotate`
//! for the job-log rotation policy, which does not apply here).

use std::path::Path;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("create log directory for {0} failed")]
    NoParentDir(std::path::PathBuf),
}

/// Install a non-blocking file-appender subscriber writing to
/// `log_path`, filtered by `RUST_LOG` (defaulting to `info`). The
/// returned guard must be held for the process lifetime -- dropping it
/// stops the background flush thread.
pub fn init(log_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard, LoggingError> {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| LoggingError::NoParentDir(log_path.to_path_buf()))?;
    std::fs::create_dir_all(dir).map_err(|_| LoggingError::NoParentDir(log_path.to_path_buf()))?;

    let file_name = log_path
        .file_name()
        .ok_or_else(|| LoggingError::NoParentDir(log_path.to_path_buf()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

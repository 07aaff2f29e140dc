// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-lifecycle guard: an exclusive PID/lock file under the
//! resolved state directory so a second instance against the same
//! `root_dir` refuses to start.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("open lock file {path} failed, {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("another instance is already running against this root_dir (lock at {path})")]
    AlreadyRunning {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write pid to {path} failed, {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A held exclusive lock on the daemon's PID file. Dropping this releases
/// the OS-level lock; the file itself is left behind with the last PID
/// that held it, matching the teacher daemon's own lock-file discipline.
pub struct LockGuard {
    _file: File,
}

/// Acquire the exclusive lock at `path`, creating it if absent, and write
/// the current process id into it. Failure to acquire is a fatal startup
/// error -- the caller must refuse to start.
pub fn acquire(path: &Path) -> Result<LockGuard, LockError> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|source| LockError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    file.try_lock_exclusive().map_err(|source| LockError::AlreadyRunning {
        path: path.to_path_buf(),
        source,
    })?;

    let mut file = file;
    file.set_len(0).map_err(|source| LockError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(file, "{}", std::process::id()).map_err(|source| LockError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(LockGuard { _file: file })
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

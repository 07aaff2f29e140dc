// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Size-bounded log rotation.
//!
//! Applied lazily at the start of each job run (see [`shed_engine::runner`]),
//! never by a background task: rotation is a side-effect of `rotate()`
//! running inside the single-flight region, so it is naturally serialized
//! per job.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotateError {
    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn rotated_path(path: &Path, gen: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{gen:04}"));
    PathBuf::from(name)
}

/// Rotate `path` if it exists and is at least `max_bytes` long, keeping at
/// most `max_gen` rolled generations (`path.0001` newest, `path.NNNN`
/// oldest). A missing `path`, or one still under the threshold, is a no-op.
///
/// Best-effort: callers log failures but must not let them block the job
/// run that triggered the check.
pub fn rotate(path: &Path, max_bytes: u64, max_gen: u32) -> Result<(), RotateError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(RotateError::Stat {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    if meta.len() < max_bytes {
        return Ok(());
    }

    let oldest = rotated_path(path, max_gen);
    if oldest.exists() {
        fs::remove_file(&oldest).map_err(|source| RotateError::Remove {
            path: oldest.clone(),
            source,
        })?;
    }

    let mut gen = max_gen.saturating_sub(1);
    while gen >= 1 {
        let from = rotated_path(path, gen);
        if from.exists() {
            let to = rotated_path(path, gen + 1);
            fs::rename(&from, &to).map_err(|source| RotateError::Rename {
                from: from.clone(),
                to,
                source,
            })?;
        }
        if gen == 1 {
            break;
        }
        gen -= 1;
    }

    let newest = rotated_path(path, 1);
    fs::rename(path, &newest).map_err(|source| RotateError::Rename {
        from: path.to_path_buf(),
        to: newest,
        source,
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "rotate_tests.rs"]
mod tests;

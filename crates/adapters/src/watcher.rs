// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watches the job-file directories for create/modify/delete events, the
//! file-system half of the reconciliation loop's two input sources.

use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A single file-system change, keyed by the affected path. The
/// reconciliation worker derives its event key (lowercased basename) from
/// this path itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEvent {
    Create(PathBuf),
    Modify(PathBuf),
    Delete(PathBuf),
}

/// Owns the underlying OS watch handles; dropping it stops the watch.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
}

impl DirWatcher {
    /// Start watching `dirs` (non-recursively), forwarding mapped events to
    /// `tx`. Failure to initialize the watcher is the one fatal startup
    /// surface the spec calls out alongside the introspection listener.
    pub fn watch(dirs: &[PathBuf], tx: mpsc::Sender<FsEvent>) -> notify::Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else {
                return;
            };
            for path in event.paths {
                let mapped = match event.kind {
                    EventKind::Create(_) => Some(FsEvent::Create(path)),
                    EventKind::Modify(_) => Some(FsEvent::Modify(path)),
                    EventKind::Remove(_) => Some(FsEvent::Delete(path)),
                    _ => None,
                };
                if let Some(ev) = mapped {
                    let _ = tx.blocking_send(ev);
                }
            }
        })?;

        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        Ok(Self { _watcher: watcher })
    }
}

/// The lowercased basename used as the reconciliation event key.
pub fn event_key(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;

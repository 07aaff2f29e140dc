// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One of the two fatal startup surfaces (the other is the introspection
//! listener, owned by the daemon crate): failure to initialize the
//! file-system watcher over the job directories.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("watch directories failed, {0}")]
    WatchInit(String),
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shed-adapters: I/O capabilities backing the scheduler core -- the
//! process runner, log rotator, java normalisation, and file-system
//! watcher.

pub mod java;
pub mod rotate;
pub mod subprocess;
pub mod watcher;

pub use rotate::{rotate, RotateError};
pub use subprocess::{run, RunOutcome, SHCED_JOB_ID_VAR, SHCED_JOB_NAME_VAR};
pub use watcher::{event_key, DirWatcher, FsEvent};

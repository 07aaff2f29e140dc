// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! shed-engine: the cron engine and its dispatch loop (component G), the
//! single-flight run guard (component C) built on the log rotator and
//! process runner, and the reconciliation loop (component H) that keeps
//! the cron engine's entry set in sync with the file and database job
//! sources.

mod cron_engine;
mod dispatch;
mod error;
mod reconcile;
mod runner;
mod single_flight;

pub use cron_engine::{CronEngine, CronError, DueJob, EntrySnapshot};
pub use dispatch::run as run_dispatcher;
pub use error::EngineError;
pub use reconcile::{start_watch, ErrorMap, ReconcileConfig, ReconcileWorker};
pub use single_flight::fire;

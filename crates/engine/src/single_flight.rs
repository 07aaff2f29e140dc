// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component C: the single-flight guard around a job run.
//!
//! `fire()` attempts the idle->running CAS; on failure it logs `[<name>]
//! running!` and returns immediately, dropping the tick rather than
//! queuing it. On success the release of the flag is guaranteed on every
//! exit path -- including a panic inside the run -- via an RAII guard
//! rather than a manual `finish()` call at the end of the function.

use std::sync::Arc;

use shed_adapters::RunOutcome;
use shed_core::{Job, RunState};

use crate::runner;

struct ReleaseOnDrop(Arc<RunState>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// `None` means the tick was dropped because a previous run of this job
/// was still in flight.
pub async fn fire(job: Arc<Job>, run_state: Arc<RunState>) -> Option<RunOutcome> {
    if !run_state.try_start() {
        tracing::warn!("[{}] running!", job.name);
        return None;
    }
    let _release = ReleaseOnDrop(run_state);
    Some(runner::run_once(&job).await)
}

#[cfg(test)]
#[path = "single_flight_tests.rs"]
mod tests;

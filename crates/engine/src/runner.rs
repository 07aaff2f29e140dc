// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work actually done once the single-flight guard admits a run:
//! rotate the job's log (component A, as a side-effect of starting, not a
//! background task), then hand off to the process runner (component B).

use shed_adapters::{rotate, run, RunOutcome};
use shed_core::{Job, DEFAULT_MAX_BYTES, DEFAULT_MAX_GEN};

/// Rotate `job`'s log if it has grown past the threshold, then run it to
/// completion or timeout. Rotation failures are logged and otherwise
/// ignored -- rotation is best-effort and must never block the run it
/// guards.
pub async fn run_once(job: &Job) -> RunOutcome {
    if let Err(e) = rotate(&job.logfile, DEFAULT_MAX_BYTES, DEFAULT_MAX_GEN) {
        tracing::warn!(job = %job.name, error = %e, "log rotation failed");
    }
    run(job).await
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;

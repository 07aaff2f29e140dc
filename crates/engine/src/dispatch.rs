// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cron dispatcher half of component G: sleeps to the soonest `next`
//! across all entries, then fires every entry whose `next <= now` in the
//! same wake. Firing launches the actual work asynchronously through
//! [`crate::single_flight::fire`] and returns promptly -- the dispatcher
//! itself never blocks on a run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use crate::cron_engine::CronEngine;
use crate::single_flight::fire;

/// With no entries registered yet, poll at this cadence rather than
/// blocking forever -- the reconciliation worker's first pass may still
/// be in flight.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Clamp `next - now` to a non-negative `std::time::Duration`. `next` is
/// never before `now` in a well-formed entry, but a wake delayed past its
/// own deadline (GC pause, heavy load) would otherwise underflow.
fn time_until(next: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Run the dispatch loop until `shutdown` reports `true`.
pub async fn run(cron: Arc<Mutex<CronEngine>>, mut shutdown: watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow() {
            return;
        }

        let deadline = cron.lock().await.next_deadline();
        let sleep = match deadline {
            Some(next) => time_until(next, Utc::now()),
            None => IDLE_POLL,
        };

        tokio::select! {
            _ = tokio::time::sleep(sleep) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    return;
                }
            }
        }

        let due = cron.lock().await.due_entries(Utc::now());
        for job in due {
            tokio::spawn(async move {
                fire(job.job, job.run_state).await;
            });
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

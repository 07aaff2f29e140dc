// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component G: the cron dispatch engine.
//!
//! Registration is keyed by [`EntryId`], which carries a source tag
//! alongside the file-sourced (lowercased basename) or DB-sourced
//! (decimal id) id-string, so a file and a DB row that happen to render
//! the same id-string can never collide as registry keys -- see
//! `shed_core::id` for why the tag, not just the string, is the identity.
//! Re-scheduling an id that is already registered carries its
//! [`RunState`] forward -- the single-flight flag must survive a reload,
//! or a reload racing an in-flight run would let a second copy start.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use shed_core::{EntryId, Job, RunState};

#[derive(Debug, thiserror::Error)]
pub enum CronError {
    #[error("parse cron expression '{expression}' failed, {source}")]
    Parse {
        expression: String,
        #[source]
        source: cron::error::Error,
    },
    #[error("parse cron expression '{0}' panicked")]
    ParsePanicked(String),
    #[error("cron expression '{0}' has no upcoming fire time")]
    NoUpcomingFire(String),
}

/// Parse a cron expression, catching panics from the underlying parser the
/// same way the collaborator contract requires.
fn parse_expression(expression: &str) -> Result<Schedule, CronError> {
    catch_unwind(AssertUnwindSafe(|| Schedule::from_str(expression)))
        .map_err(|_| CronError::ParsePanicked(expression.to_string()))?
        .map_err(|source| CronError::Parse {
            expression: expression.to_string(),
            source,
        })
}

/// `schedule.next(after)`: monotone, never returns a time before `after`.
fn next_fire(schedule: &Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

struct Entry {
    job: Arc<Job>,
    schedule: Schedule,
    prev: Option<DateTime<Utc>>,
    next: DateTime<Utc>,
    run_state: Arc<RunState>,
}

/// A read-only view of one registered entry, for introspection.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EntrySnapshot {
    #[serde(skip)]
    pub id: EntryId,
    pub expression: String,
    pub prev: Option<DateTime<Utc>>,
    pub next: DateTime<Utc>,
}

/// A job whose fire time has arrived, handed to the dispatcher for
/// execution. Carries its own [`RunState`] so the caller can run it
/// through the single-flight guard without looking it back up.
pub struct DueJob {
    pub job: Arc<Job>,
    pub run_state: Arc<RunState>,
}

/// The engine's entry registry. Mutated only by the reconciliation worker
/// (per the concurrency model); read by the dispatcher and introspection.
#[derive(Default)]
pub struct CronEngine {
    entries: HashMap<EntryId, Entry>,
}

impl CronEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the entry for `job.entry_id()`. An existing
    /// entry's [`RunState`] is carried over to the replacement.
    pub fn schedule(&mut self, job: Job, now: DateTime<Utc>) -> Result<Arc<RunState>, CronError> {
        let schedule = parse_expression(&job.expression)?;
        let next = next_fire(&schedule, now)
            .ok_or_else(|| CronError::NoUpcomingFire(job.expression.clone()))?;
        let id = job.entry_id();
        let run_state = self
            .entries
            .remove(&id)
            .map(|entry| entry.run_state)
            .unwrap_or_default();

        self.entries.insert(
            id,
            Entry {
                job: Arc::new(job),
                schedule,
                prev: None,
                next,
                run_state: run_state.clone(),
            },
        );
        Ok(run_state)
    }

    /// Remove the entry for `id`, if present. No error if absent.
    pub fn unschedule(&mut self, id: &EntryId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The soonest `next` across every entry; `None` with no entries.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.entries.values().map(|e| e.next).min()
    }

    /// Pop every entry whose `next <= now` for execution, recomputing each
    /// one's `next` fire time in the same pass. Missed ticks during a slow
    /// wake are coalesced: each entry fires at most once per call.
    pub fn due_entries(&mut self, now: DateTime<Utc>) -> Vec<DueJob> {
        let mut due = Vec::new();
        for entry in self.entries.values_mut() {
            if entry.next <= now {
                due.push(DueJob {
                    job: entry.job.clone(),
                    run_state: entry.run_state.clone(),
                });
                entry.prev = Some(entry.next);
                if let Some(next) = next_fire(&entry.schedule, now) {
                    entry.next = next;
                }
            }
        }
        due
    }

    /// Snapshot for the introspection endpoint.
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        self.entries
            .iter()
            .map(|(id, entry)| EntrySnapshot {
                id: id.clone(),
                expression: entry.job.expression.clone(),
                prev: entry.prev,
                next: entry.next,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "cron_engine_tests.rs"]
mod tests;

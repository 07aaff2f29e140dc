// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Job record: an immutable description of a scheduled executable run.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::id::EntryId;

/// Default kill deadline when a job file omits `timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);
/// Default log rotation threshold.
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Default number of rotated generations to retain.
pub const DEFAULT_MAX_GEN: u32 = 5;

/// Where a Job record originated. Determines its id-string namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSource {
    /// A job file in a watched directory. Has no database identity.
    File,
    /// A row in the jobs table, carrying its version key for diffing.
    Db {
        id: i64,
        updated_at: DateTime<Utc>,
    },
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// The ephemeral single-flight run-state flag described in the data model.
///
/// Transitions only via CAS idle->running (`try_start`) and a release store
/// running->idle (`finish`). Never guarded by a lock.
#[derive(Debug, Default)]
pub struct RunState(AtomicU8);

impl RunState {
    /// Atomically transitions idle -> running. Returns `true` on success.
    ///
    /// Callers that get `false` must treat the tick as dropped, not queued.
    pub fn try_start(&self) -> bool {
        self.0
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases the flag. Must run on every exit path of a started run.
    pub fn finish(&self) {
        self.0.store(IDLE, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire) == RUNNING
    }
}

/// Immutable description of an executable run, as produced by a loader.
///
/// Loaders are responsible for producing fully-resolved records: no template
/// placeholders remain in any field after loading, and java normalisation (if
/// applicable) has already been applied.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    pub source: JobSource,
    pub expression: String,
    pub execute: String,
    pub arguments: Vec<String>,
    pub environments: Vec<String>,
    /// Working-directory hint. Currently informational only: the child
    /// inherits the scheduler's own cwd rather than this value. See
    /// DESIGN.md for why this quirk is preserved rather than fixed.
    pub directory: Option<String>,
    pub logfile: PathBuf,
    pub timeout: Duration,
}

impl Job {
    /// The id-string under which this job is registered with the cron engine.
    pub fn entry_id(&self) -> EntryId {
        match &self.source {
            JobSource::File => EntryId::for_file(&self.name),
            JobSource::Db { id, .. } => EntryId::for_db_row(*id),
        }
    }

    /// `Some(id)` for DB-sourced jobs; used to build the `shced_job_id` var.
    pub fn db_id(&self) -> Option<i64> {
        match self.source {
            JobSource::Db { id, .. } => Some(id),
            JobSource::File => None,
        }
    }

    /// The version key used by DB-poll reconciliation; `None` for file jobs.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self.source {
            JobSource::Db { updated_at, .. } => Some(updated_at),
            JobSource::File => None,
        }
    }
}

/// The comparison key the DB-poll handler diffs on: a `NULL updated_at`
/// collapses to a fixed sentinel (the Unix epoch) rather than the unstable
/// "now" it would otherwise read as, so two consecutive NULLs compare equal
/// and never look like a change.
pub fn version_key(updated_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    updated_at.unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap_or_else(Utc::now))
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;

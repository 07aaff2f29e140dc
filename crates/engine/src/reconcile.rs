// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component H: the reconciliation loop. A single worker multiplexes
//! file-system events over the watched job directories with a periodic
//! database poll, serializing every mutation of the cron engine and the
//! error map through itself -- neither is ever touched from the
//! dispatcher or from introspection.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use shed_adapters::{event_key, DirWatcher, FsEvent};
use shed_core::EntryId;
use shed_loader::{list_job_files, load_job_from_file, to_string_map, ArgMap};
use shed_storage::{normalize, DbBackend};
use tokio::sync::{mpsc, Mutex};

use crate::cron_engine::CronEngine;
use crate::error::EngineError;

/// The error map the reconciliation worker maintains alongside the cron
/// engine: one message per id-string whose most recent load attempt
/// failed. Read by the introspection endpoint; written only here.
#[derive(Debug, Default)]
pub struct ErrorMap(HashMap<EntryId, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, id: EntryId, message: String) {
        self.0.insert(id, message);
    }

    fn clear(&mut self, id: &EntryId) {
        self.0.remove(id);
    }

    /// A stable, owned copy for the `/errors` introspection handler.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(id, msg)| (id.as_str().to_string(), msg.clone()))
            .collect()
    }
}

/// Start watching `dirs`, the one other fatal startup surface besides the
/// introspection listener.
pub fn start_watch(
    dirs: &[PathBuf],
) -> Result<(DirWatcher, mpsc::Receiver<FsEvent>), EngineError> {
    let (tx, rx) = mpsc::channel(64);
    let watcher = DirWatcher::watch(dirs, tx).map_err(|e| EngineError::WatchInit(e.to_string()))?;
    Ok((watcher, rx))
}

/// Everything the worker needs that doesn't change across its lifetime.
pub struct ReconcileConfig {
    pub roots: Vec<PathBuf>,
    pub global_args: ArgMap,
    pub log_path: PathBuf,
    pub java_home: String,
    pub poll_interval: Duration,
}

pub struct ReconcileWorker {
    cron: Arc<Mutex<CronEngine>>,
    errors: Arc<Mutex<ErrorMap>>,
    healthy: Arc<AtomicBool>,
    config: ReconcileConfig,
    db: Option<DbBackend>,
    db_args: HashMap<String, String>,
    /// Last-seen `(id, updated_at)` snapshot for DB-sourced entries,
    /// touched only by this worker.
    db_snapshot: HashMap<i64, Option<DateTime<Utc>>>,
}

impl ReconcileWorker {
    pub fn new(
        cron: Arc<Mutex<CronEngine>>,
        errors: Arc<Mutex<ErrorMap>>,
        healthy: Arc<AtomicBool>,
        config: ReconcileConfig,
        db: Option<DbBackend>,
    ) -> Self {
        let db_args = to_string_map(&config.global_args);
        Self {
            cron,
            errors,
            healthy,
            config,
            db,
            db_args,
            db_snapshot: HashMap::new(),
        }
    }

    /// Load every file and DB job once, then mark the worker healthy.
    /// `/healthz` reports ready only after this completes. Each file is
    /// loaded independently, so one bad file is recorded in the error map
    /// without blocking the rest of the directory.
    pub async fn initial_load(&mut self) {
        for path in list_job_files(&self.config.roots) {
            self.load_file_entry(&path).await;
        }

        if self.db.is_some() {
            self.load_all_db_rows().await;
            self.refresh_db_snapshot().await;
        }

        self.healthy.store(true, Ordering::Release);
        tracing::info!("reconciliation worker completed its first pass");
    }

    /// Drive the event loop: file-system events and the DB poll timer,
    /// processed one at a time for as long as the event channel stays
    /// open.
    pub async fn run(mut self, mut fs_rx: mpsc::Receiver<FsEvent>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.tick().await; // first tick fires immediately; consume it
        loop {
            tokio::select! {
                event = fs_rx.recv() => {
                    match event {
                        Some(event) => self.handle_fs_event(event).await,
                        None => {
                            tracing::warn!("file watch channel closed, reconciliation worker stopping");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.handle_db_poll().await;
                }
            }
        }
    }

    async fn handle_fs_event(&mut self, event: FsEvent) {
        match event {
            FsEvent::Create(path) => self.load_file_entry(&path).await,
            FsEvent::Modify(path) => {
                let id = EntryId::for_file(&event_key(&path));
                self.cron.lock().await.unschedule(&id);
                self.errors.lock().await.clear(&id);
                self.load_file_entry(&path).await;
            }
            FsEvent::Delete(path) => {
                let id = EntryId::for_file(&event_key(&path));
                self.cron.lock().await.unschedule(&id);
                self.errors.lock().await.clear(&id);
            }
        }
    }

    async fn load_file_entry(&mut self, path: &std::path::Path) {
        let id = EntryId::for_file(&event_key(path));
        match load_job_from_file(
            path,
            &self.config.global_args,
            &self.config.log_path,
            &self.config.java_home,
        ) {
            Ok(job) => self.schedule_or_record(job, Utc::now()).await,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "job file load failed");
                self.errors.lock().await.set(id, e.to_string());
            }
        }
    }

    async fn schedule_or_record(&mut self, job: shed_core::Job, now: DateTime<Utc>) {
        let id = job.entry_id();
        let name = job.name.clone();
        let result = self.cron.lock().await.schedule(job, now);
        match result {
            Ok(_) => {
                self.errors.lock().await.clear(&id);
                tracing::info!(job = %name, "scheduled");
            }
            Err(e) => {
                tracing::warn!(job = %name, error = %e, "schedule failed");
                self.errors.lock().await.set(id, e.to_string());
            }
        }
    }

    async fn load_all_db_rows(&mut self) {
        let Some(db) = &self.db else { return };
        match db.where_jobs(None).await {
            Ok(rows) => {
                let now = Utc::now();
                for row in rows {
                    let entry_id = EntryId::for_db_row(row.id);
                    match normalize(row, &self.db_args, &self.config.log_path, &self.config.java_home) {
                        Ok(job) => self.schedule_or_record(job, now).await,
                        Err(e) => {
                            tracing::warn!(id = %entry_id, error = %e, "db row normalisation failed");
                            self.errors.lock().await.set(entry_id, e.to_string());
                        }
                    }
                }
            }
            Err(e) => tracing::error!(error = %e, "initial db load failed"),
        }
    }

    async fn refresh_db_snapshot(&mut self) {
        let Some(db) = &self.db else { return };
        match db.snapshot(None).await {
            Ok(rows) => {
                self.db_snapshot = rows.into_iter().map(|v| (v.id, v.updated_at)).collect();
            }
            Err(e) => tracing::warn!(error = %e, "db snapshot failed"),
        }
    }

    /// 1. Fetch the current `(id, updated_at)` snapshot.
    /// 2. Existing entries whose `updated_at` changed are reloaded;
    ///    entries whose id vanished are unscheduled.
    /// 3. Ids new to the snapshot are loaded and scheduled.
    async fn handle_db_poll(&mut self) {
        let Some(db) = &self.db else { return };
        let mut current: HashMap<i64, Option<DateTime<Utc>>> = match db.snapshot(None).await {
            Ok(rows) => rows.into_iter().map(|v| (v.id, v.updated_at)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "db poll failed, keeping prior entries");
                return;
            }
        };

        let previously_known: Vec<(i64, Option<DateTime<Utc>>)> =
            self.db_snapshot.iter().map(|(id, ts)| (*id, *ts)).collect();

        for (id, prev_updated_at) in previously_known {
            match current.remove(&id) {
                Some(new_updated_at) if new_updated_at != prev_updated_at => {
                    self.reload_db_row(id).await;
                }
                Some(_) => {}
                None => {
                    let entry_id = EntryId::for_db_row(id);
                    self.cron.lock().await.unschedule(&entry_id);
                    self.errors.lock().await.clear(&entry_id);
                }
            }
        }

        // Remaining ids are new to the snapshot.
        let new_ids: Vec<i64> = current.keys().copied().collect();
        for id in new_ids {
            self.reload_db_row(id).await;
        }

        self.refresh_db_snapshot().await;
    }

    /// Re-fetch and re-normalise a single DB row by id, then
    /// unschedule-then-schedule it under its decimal-id key. A DB error
    /// here leaves the prior Entry untouched (fail-closed to "keep
    /// serving stale").
    async fn reload_db_row(&mut self, id: i64) {
        let Some(db) = &self.db else { return };
        let entry_id = EntryId::for_db_row(id);
        match db.find(id).await {
            Ok(Some(row)) => {
                match normalize(row, &self.db_args, &self.config.log_path, &self.config.java_home) {
                    Ok(job) => {
                        self.cron.lock().await.unschedule(&entry_id);
                        self.schedule_or_record(job, Utc::now()).await;
                    }
                    Err(e) => {
                        tracing::warn!(id, error = %e, "db row normalisation failed");
                        self.errors.lock().await.set(entry_id, e.to_string());
                    }
                }
            }
            Ok(None) => {
                self.cron.lock().await.unschedule(&entry_id);
                self.errors.lock().await.clear(&entry_id);
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "db reload failed, keeping stale entry");
            }
        }
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

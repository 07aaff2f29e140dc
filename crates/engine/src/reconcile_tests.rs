// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shed_storage::DEFAULT_TABLE;
use tempfile::tempdir;

fn worker(roots: Vec<PathBuf>, db: Option<DbBackend>) -> (ReconcileWorker, Arc<Mutex<CronEngine>>, Arc<Mutex<ErrorMap>>, Arc<AtomicBool>) {
    let cron = Arc::new(Mutex::new(CronEngine::new()));
    let errors = Arc::new(Mutex::new(ErrorMap::new()));
    let healthy = Arc::new(AtomicBool::new(false));
    let config = ReconcileConfig {
        roots,
        global_args: ArgMap::new(),
        log_path: std::env::temp_dir(),
        java_home: "/usr/bin/java".to_string(),
        poll_interval: Duration::from_secs(60),
    };
    let w = ReconcileWorker::new(cron.clone(), errors.clone(), healthy.clone(), config, db);
    (w, cron, errors, healthy)
}

fn write_job_file(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[tokio::test]
async fn initial_load_schedules_valid_job_files_and_marks_healthy() {
    let dir = tempdir().unwrap();
    write_job_file(
        dir.path(),
        "nightly.job",
        r#"{"expression": "0 0 0 * * *", "execute": "/bin/true"}"#,
    );

    let (mut w, cron, _errors, healthy) = worker(vec![dir.path().to_path_buf()], None);
    w.initial_load().await;

    assert!(healthy.load(Ordering::Acquire));
    assert!(cron.lock().await.contains(&EntryId::for_file("nightly.job")));
}

#[tokio::test]
async fn initial_load_records_invalid_job_file_in_error_map() {
    let dir = tempdir().unwrap();
    write_job_file(dir.path(), "broken.job", r#"{"execute": "/bin/true"}"#);

    let (mut w, cron, errors, _healthy) = worker(vec![dir.path().to_path_buf()], None);
    w.initial_load().await;

    assert!(!cron.lock().await.contains(&EntryId::for_file("broken.job")));
    let snapshot = errors.lock().await.snapshot();
    assert!(snapshot.contains_key("broken.job"));
}

#[tokio::test]
async fn modify_event_clears_stale_error_and_reschedules() {
    let dir = tempdir().unwrap();
    let path = write_job_file(dir.path(), "fix.job", r#"{"execute": "/bin/true"}"#);

    let (mut w, cron, errors, _healthy) = worker(vec![dir.path().to_path_buf()], None);
    w.initial_load().await;
    assert!(errors.lock().await.snapshot().contains_key("fix.job"));

    std::fs::write(&path, r#"{"expression": "0 0 0 * * *", "execute": "/bin/true"}"#).unwrap();
    w.handle_fs_event(FsEvent::Modify(path)).await;

    assert!(cron.lock().await.contains(&EntryId::for_file("fix.job")));
    assert!(!errors.lock().await.snapshot().contains_key("fix.job"));
}

#[tokio::test]
async fn delete_event_unschedules_and_clears_error() {
    let dir = tempdir().unwrap();
    let path = write_job_file(
        dir.path(),
        "gone.job",
        r#"{"expression": "0 0 0 * * *", "execute": "/bin/true"}"#,
    );

    let (mut w, cron, errors, _healthy) = worker(vec![dir.path().to_path_buf()], None);
    w.initial_load().await;
    assert!(cron.lock().await.contains(&EntryId::for_file("gone.job")));

    w.handle_fs_event(FsEvent::Delete(path)).await;
    assert!(!cron.lock().await.contains(&EntryId::for_file("gone.job")));
    assert!(!errors.lock().await.snapshot().contains_key("gone.job"));
}

async fn sqlite_backend(rows: &[(i64, &str, &str, Option<&str>)]) -> DbBackend {
    sqlx::any::install_default_drivers();
    let pool = sqlx::any::AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE sched_jobs (
            id INTEGER PRIMARY KEY, name TEXT NOT NULL, expression TEXT NOT NULL,
            execute TEXT NOT NULL, directory TEXT, arguments TEXT, environments TEXT,
            kill_after_interval INTEGER, created_at TEXT, updated_at TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    for (id, expr, execute, updated_at) in rows {
        sqlx::query("INSERT INTO sched_jobs (id, name, expression, execute, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(format!("job{id}"))
            .bind(*expr)
            .bind(*execute)
            .bind(*updated_at)
            .execute(&pool)
            .await
            .unwrap();
    }
    DbBackend::from_pool(pool, "sqlite", DEFAULT_TABLE)
}

#[tokio::test]
async fn db_poll_schedules_new_rows_and_drops_removed_ones() {
    let backend = sqlite_backend(&[(1, "0 0 0 * * *", "/bin/true", Some("2026-01-01T00:00:00Z"))]).await;
    let (mut w, cron, _errors, _healthy) = worker(vec![], Some(backend));
    w.initial_load().await;
    assert!(cron.lock().await.contains(&EntryId::for_db_row(1)));

    // Row 1 removed, row 2 appears: re-seed a fresh backend reflecting the new state.
    let backend2 = sqlite_backend(&[(2, "0 0 0 * * *", "/bin/true", None)]).await;
    w.db = Some(backend2);
    w.handle_db_poll().await;

    assert!(!cron.lock().await.contains(&EntryId::for_db_row(1)));
    assert!(cron.lock().await.contains(&EntryId::for_db_row(2)));
}

#[tokio::test]
async fn db_poll_reloads_row_whose_updated_at_changed() {
    let backend = sqlite_backend(&[(1, "0 0 0 * * *", "/bin/true", Some("2026-01-01T00:00:00Z"))]).await;
    let (mut w, cron, _errors, _healthy) = worker(vec![], Some(backend));
    w.initial_load().await;

    let backend2 = sqlite_backend(&[(1, "0 30 0 * * *", "/bin/true", Some("2026-01-02T00:00:00Z"))]).await;
    w.db = Some(backend2);
    w.handle_db_poll().await;

    let snapshot = cron.lock().await.entries();
    let entry = snapshot.iter().find(|e| e.id == EntryId::for_db_row(1)).unwrap();
    assert_eq!(entry.expression, "0 30 0 * * *");
}

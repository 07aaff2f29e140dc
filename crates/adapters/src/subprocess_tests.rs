// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shed_core::JobSource;
use std::time::Duration;
use tempfile::tempdir;

fn job(execute: &str, arguments: Vec<&str>, timeout: Duration, logfile: std::path::PathBuf) -> Job {
    Job {
        name: "x".to_string(),
        source: JobSource::File,
        expression: "* * * * * *".to_string(),
        execute: execute.to_string(),
        arguments: arguments.into_iter().map(String::from).collect(),
        environments: vec!["FOO=bar".to_string()],
        directory: None,
        logfile,
        timeout,
    }
}

#[tokio::test]
async fn runs_to_completion_and_writes_banners() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("job_x.log");
    let j = job("/bin/echo", vec!["hello"], Duration::from_secs(5), log.clone());

    let outcome = run(&j).await;
    assert_eq!(outcome, RunOutcome::Exited);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.starts_with("=============== begin ===============\r\n"));
    assert!(contents.contains("/bin/echo\r\n"));
    assert!(contents.contains("\thello\r\n"));
    assert!(contents.contains("===============  out  ===============\r\n"));
    assert!(contents.contains("hello\n"));
    assert!(contents.contains("run ok, exit with"));
    assert!(contents.ends_with("===============  end  ===============\r\n"));
}

#[tokio::test]
async fn injects_shced_job_name_for_a_file_sourced_job() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("job_x.log");
    let j = job("/usr/bin/env", vec![], Duration::from_secs(5), log.clone());

    let outcome = run(&j).await;
    assert_eq!(outcome, RunOutcome::Exited);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains(&format!("{SHCED_JOB_NAME_VAR}=x")));
    assert!(contents.contains("FOO=bar"));
    // A file-sourced job has no database id, so the id var is never set.
    assert!(!contents.contains(&format!("{SHCED_JOB_ID_VAR}=")));
}

#[tokio::test]
async fn injects_both_shced_vars_for_a_db_sourced_job() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("job_x.log");
    let mut j = job("/usr/bin/env", vec![], Duration::from_secs(5), log.clone());
    j.source = JobSource::Db {
        id: 42,
        updated_at: chrono::Utc::now(),
    };

    let outcome = run(&j).await;
    assert_eq!(outcome, RunOutcome::Exited);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains(&format!("{SHCED_JOB_ID_VAR}=42")));
    assert!(contents.contains(&format!("{SHCED_JOB_NAME_VAR}=x")));
}

#[tokio::test]
async fn kills_on_timeout() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("job_x.log");
    let j = job(
        "/bin/sleep",
        vec!["10"],
        Duration::from_millis(200),
        log.clone(),
    );

    let started = std::time::Instant::now();
    let outcome = run(&j).await;
    assert_eq!(outcome, RunOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_millis(1000));

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("run timeout, kill it.\r\n"));
}

#[tokio::test]
async fn spawn_failure_is_recorded_in_log() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("job_x.log");
    let j = job(
        "/no/such/executable-xyz",
        vec![],
        Duration::from_secs(5),
        log.clone(),
    );

    let outcome = run(&j).await;
    assert_eq!(outcome, RunOutcome::SpawnFailed);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("start failed,"));
}

#[tokio::test]
async fn log_open_failure_does_not_panic() {
    let j = job(
        "/bin/echo",
        vec![],
        Duration::from_secs(5),
        std::path::PathBuf::from("/nonexistent-root-dir-xyz/job_x.log"),
    );
    // create_dir_all under a root nobody can create should fail; if the
    // sandbox permits it, fall back to accepting either outcome.
    let outcome = run(&j).await;
    assert!(matches!(
        outcome,
        RunOutcome::LogOpenFailed | RunOutcome::Exited
    ));
}

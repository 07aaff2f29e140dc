// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use shed_core::{JobSource, DEFAULT_TIMEOUT};
use std::time::Duration;
use tempfile::tempdir;

fn job(name: &str, execute: &str, arguments: Vec<String>, logfile: std::path::PathBuf) -> Arc<Job> {
    Arc::new(Job {
        name: name.to_string(),
        source: JobSource::File,
        expression: "* * * * * *".to_string(),
        execute: execute.to_string(),
        arguments,
        environments: vec![],
        directory: None,
        logfile,
        timeout: DEFAULT_TIMEOUT,
    })
}

#[tokio::test]
async fn fire_runs_when_idle_and_releases_afterwards() {
    let dir = tempdir().unwrap();
    let logfile = dir.path().join("job_ok.log");
    let state = Arc::new(RunState::default());
    let outcome = fire(job("ok", "/bin/true", vec![], logfile), state.clone()).await;
    assert_eq!(outcome, Some(RunOutcome::Exited));
    assert!(!state.is_running());
}

#[tokio::test]
async fn fire_drops_tick_when_already_running() {
    let dir = tempdir().unwrap();
    let logfile = dir.path().join("job_busy.log");
    let state = Arc::new(RunState::default());
    assert!(state.try_start());

    let outcome = fire(job("busy", "/bin/true", vec![], logfile), state.clone()).await;
    assert_eq!(outcome, None);
    // The flag stays running -- fire() didn't touch it on the drop path.
    assert!(state.is_running());
    state.finish();
}

#[tokio::test]
async fn concurrent_fires_admit_only_one_run() {
    let dir = tempdir().unwrap();
    let logfile = dir.path().join("job_slow.log");
    let state = Arc::new(RunState::default());

    let j1 = job("slow", "/bin/sleep", vec!["0.2".to_string()], logfile.clone());
    let j2 = job("slow", "/bin/sleep", vec!["0.2".to_string()], logfile);

    let first = tokio::spawn(fire(j1, state.clone()));
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second_outcome = fire(j2, state.clone()).await;

    assert_eq!(second_outcome, None);
    let first_outcome = first.await.unwrap();
    assert_eq!(first_outcome, Some(RunOutcome::Exited));
}

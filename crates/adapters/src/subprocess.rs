// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process runner: spawns a job's child, streams its output to the
//! job's own log file, and enforces the job's timeout.
//!
//! Called from inside the single-flight region (`shed_engine::single_flight`)
//! so there is never more than one runner active per job at a time.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use shed_core::Job;
use tokio::process::Command;
use tokio::sync::mpsc;

/// The two scheduler-injected environment variables, with their literal
/// misspelling ("shced" for "sched") preserved verbatim: downstream job
/// scripts may already depend on this exact spelling.
pub const SHCED_JOB_ID_VAR: &str = "shced_job_id";
pub const SHCED_JOB_NAME_VAR: &str = "shced_job_name";

const BEGIN_BANNER: &str = "=============== begin ===============\r\n";
const END_BANNER: &str = "===============  end  ===============\r\n";
const OUT_BANNER: &str = "===============  out  ===============\r\n";

/// How a run concluded. The caller (the single-flight guard) uses this to
/// decide whether to mirror the timeout line to the scheduler's own log.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The log file could not be opened; nothing was launched.
    LogOpenFailed,
    /// `spawn()` itself failed.
    SpawnFailed,
    /// The child exited (cleanly or not) before the timeout elapsed.
    Exited,
    /// The timeout elapsed first and the child was killed.
    TimedOut,
}

fn job_env_pairs(job: &Job) -> Vec<(String, String)> {
    job.environments
        .iter()
        .filter_map(|entry| entry.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Run `job`'s executable to completion or until its timeout elapses.
///
/// Opens `job.logfile` for append (creating it if absent), writes the
/// begin/argv/out banners, spawns the child with its own environment and
/// with the log file attached as both stdout and stderr, then races the
/// child's exit against `job.timeout`. The end banner is written on every
/// return path.
pub async fn run(job: &Job) -> RunOutcome {
    let mut file = match open_log(&job.logfile) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(job = %job.name, error = %e, "failed to open job log file");
            return RunOutcome::LogOpenFailed;
        }
    };

    let _ = file.write_all(BEGIN_BANNER.as_bytes());

    let outcome = run_inner(job, &mut file).await;

    let _ = file.write_all(END_BANNER.as_bytes());
    outcome
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

async fn run_inner(job: &Job, file: &mut File) -> RunOutcome {
    let _ = writeln!(file, "{}\r", job.execute);
    for arg in &job.arguments {
        let _ = write!(file, "\t{arg}\r\n");
    }
    let _ = file.write_all(OUT_BANNER.as_bytes());

    let stdout = match file.try_clone() {
        Ok(f) => f,
        Err(e) => {
            let _ = write!(file, "start failed, {e}\r\n");
            return RunOutcome::SpawnFailed;
        }
    };
    let stderr = match file.try_clone() {
        Ok(f) => f,
        Err(e) => {
            let _ = write!(file, "start failed, {e}\r\n");
            return RunOutcome::SpawnFailed;
        }
    };

    let mut cmd = Command::new(&job.execute);
    cmd.args(&job.arguments);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::from(stdout));
    cmd.stderr(Stdio::from(stderr));
    for (k, v) in job_env_pairs(job) {
        cmd.env(k, v);
    }
    if let Some(id) = job.db_id() {
        cmd.env(SHCED_JOB_ID_VAR, id.to_string());
    }
    cmd.env(SHCED_JOB_NAME_VAR, &job.name);

    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            let _ = write!(file, "start failed, {e}\r\n");
            return RunOutcome::SpawnFailed;
        }
    };

    // Bounded with capacity 1 so the waiter task never blocks if the
    // timeout branch wins the race below.
    let (tx, mut rx) = mpsc::channel(1);
    let mut waiter = child.wait();
    let wait_task = tokio::spawn(async move {
        let result = (&mut waiter).await;
        let _ = tx.send(result).await;
    });

    tokio::select! {
        result = rx.recv() => {
            wait_task.abort();
            match result {
                Some(Ok(status)) if status.success() => {
                    let _ = write!(file, "run ok, exit with {status}.\r\n");
                }
                Some(Ok(status)) => {
                    let _ = write!(file, "run failed, exit with {status}.\r\n");
                }
                Some(Err(e)) => {
                    let _ = write!(file, "run failed, {e}\r\n");
                }
                None => {
                    let _ = write!(file, "run failed, wait channel closed\r\n");
                }
            }
            RunOutcome::Exited
        }
        _ = tokio::time::sleep(job.timeout) => {
            // tokio's Child::kill() already abstracts the OS-specific
            // termination primitive (OpenProcess+TerminateProcess on
            // Windows, a signal on unix) behind one portable method --
            // exactly the single-method capability the runner needs.
            let _ = child.kill().await;
            let _ = write!(file, "run timeout, kill it.\r\n");
            RunOutcome::TimedOut
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;

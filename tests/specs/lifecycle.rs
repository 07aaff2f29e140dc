//! Process-lifecycle specs: the PID lock, a second instance being
//! refused, and a job file dropped into the root directory not crashing
//! the daemon.

use crate::prelude::*;

#[test]
fn daemon_writes_its_lock_file_on_start() {
    let mut daemon = DaemonProcess::spawn();
    assert!(daemon.lock_path().is_file());

    let pid = std::fs::read_to_string(daemon.lock_path()).unwrap();
    assert!(!pid.trim().is_empty());

    daemon.stop();
}

#[test]
fn daemon_writes_its_own_operational_log() {
    let mut daemon = DaemonProcess::spawn();
    let log_path = daemon.root().join("shedd.log");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || log_path.is_file()),
        "daemon did not create its log file in time"
    );
    daemon.stop();
}

#[test]
fn second_instance_against_same_root_is_refused() {
    let mut primary = DaemonProcess::spawn();

    let output = shedd_cmd()
        .args(["--root", &primary.root().display().to_string()])
        .args(["--listen", ":0"])
        .output()
        .expect("shedd should spawn");

    assert!(!output.status.success());
    assert!(output.stderr_string().contains("already running"));

    primary.stop();
}

#[test]
fn stopping_the_primary_lets_a_second_instance_start() {
    let mut primary = DaemonProcess::spawn();
    primary.stop();

    let mut second = DaemonProcess::spawn_at(primary.root().to_path_buf(), &[]);
    assert!(second.lock_path().is_file());
    second.stop();
}

#[test]
fn daemon_stays_up_after_a_valid_job_file_appears() {
    let mut daemon = DaemonProcess::spawn();
    daemon.write_job(
        "nightly",
        r#"{"expression": "0 0 0 * * *", "execute": "/bin/true", "timeout": "10s"}"#,
    );

    std::thread::sleep(std::time::Duration::from_millis(200));
    assert!(daemon.is_alive(), "daemon should not crash on a valid job file");

    daemon.stop();
}

#[test]
fn daemon_stays_up_after_an_invalid_job_file_appears() {
    let mut daemon = DaemonProcess::spawn();
    daemon.write_job("broken", r#"{"execute": "/bin/true"}"#);

    std::thread::sleep(std::time::Duration::from_millis(200));
    assert!(
        daemon.is_alive(),
        "a single bad job file must not take the whole daemon down"
    );

    daemon.stop();
}

//! Config-loading specs: an explicit `--config` pointing at a file that
//! does not exist is a startup error, before the lock file or log file
//! are ever touched.

use crate::prelude::*;

#[test]
fn missing_explicit_config_file_fails_before_touching_root() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--config", "/nonexistent/shedd.conf"]);

    assert!(!output.status.success());
    assert!(output.stderr_string().contains("nonexistent"));
    assert!(!dir.path().join("shedd.pid").exists());
}

#[test]
fn bad_db_url_does_not_prevent_startup() {
    // DB connect failures are fail-open: the daemon still starts serving
    // file-sourced jobs, it just never successfully connects.
    let mut daemon = DaemonProcess::spawn_with_args(&["--db-url", "postgres://nope/nope"]);
    assert!(daemon.lock_path().is_file());
    daemon.stop();
}

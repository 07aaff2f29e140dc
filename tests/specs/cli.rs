//! CLI flag surface specs: these all exit before the daemon becomes
//! long-running, so a plain `output()` is enough.

use crate::prelude::*;

#[test]
fn help_flag_shows_usage_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--help"]);
    assert!(output.status.success());
    assert!(output.stdout_string().contains("Usage"));
}

#[test]
fn version_flag_shows_version_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert!(output.stdout_string().contains("shedd"));
}

#[test]
fn unknown_flag_fails_with_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--not-a-real-flag"]);
    assert!(!output.status.success());
}

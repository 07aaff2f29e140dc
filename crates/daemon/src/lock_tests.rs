// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn acquire_writes_current_pid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shedd.pid");

    let _guard = acquire(&path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
}

#[test]
fn second_acquire_against_same_path_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shedd.pid");

    let _first = acquire(&path).unwrap();
    let second = acquire(&path);
    assert!(matches!(second, Err(LockError::AlreadyRunning { .. })));
}

#[test]
fn lock_is_released_on_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shedd.pid");

    {
        let _first = acquire(&path).unwrap();
    }
    let second = acquire(&path);
    assert!(second.is_ok());
}

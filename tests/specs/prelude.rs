//! Test helpers for the shedd behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};
use std::time::{Duration, Instant};

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 3000;

/// Resolve the built `shedd` binary, checking llvm-cov's target directory
/// before falling back to the standard debug directory.
fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug/shedd");
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug/shedd");
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("shedd");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn shedd_cmd() -> Command {
    Command::new(binary_path())
}

/// Poll `condition` until it returns true or `timeout_ms` elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll);
    }
    false
}

/// Run `shedd` with `args` against `root` and capture its output. Used
/// for the startup paths that fail before the daemon becomes long-running
/// (bad `--config`, `--help`, `--version`).
pub fn run(root: &Path, args: &[&str]) -> Output {
    shedd_cmd()
        .args(["--root", &root.display().to_string()])
        .args(["--listen", ":0"])
        .args(args)
        .output()
        .expect("shedd should spawn")
}

pub trait OutputExt {
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;
}

impl OutputExt for Output {
    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// A long-running `shedd` instance spawned against a root directory.
/// Killed with `SIGTERM` on drop so a test failure never leaves a daemon
/// bound to a port behind. `_owned_root`, when present, is the temp
/// directory backing `root` and is cleaned up when this drops; a
/// `DaemonProcess` pointed at someone else's root leaves it alone.
pub struct DaemonProcess {
    child: Child,
    root: PathBuf,
    _owned_root: Option<tempfile::TempDir>,
}

impl DaemonProcess {
    /// Spawn a daemon against a fresh, owned root directory.
    pub fn spawn() -> Self {
        Self::spawn_with_args(&[])
    }

    /// Spawn a daemon against a fresh, owned root directory with extra
    /// flags.
    pub fn spawn_with_args(extra: &[&str]) -> Self {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self::spawn_inner(root, extra, Some(tempdir))
    }

    /// Spawn a daemon against an existing root directory this
    /// `DaemonProcess` does not own (e.g. one a previous instance used).
    pub fn spawn_at(root: PathBuf, extra: &[&str]) -> Self {
        Self::spawn_inner(root, extra, None)
    }

    fn spawn_inner(root: PathBuf, extra: &[&str], owned_root: Option<tempfile::TempDir>) -> Self {
        let child = shedd_cmd()
            .args(["--root", &root.display().to_string()])
            .args(["--listen", ":0"])
            .args(extra)
            .spawn()
            .expect("shedd should spawn");

        let lock_path = root.join("shedd.pid");
        assert!(
            wait_for(SPEC_WAIT_MAX_MS, || lock_path.is_file()),
            "daemon did not create its lock file in time"
        );

        Self {
            child,
            root,
            _owned_root: owned_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join("shedd.pid")
    }

    /// `true` if the daemon process has not exited.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    pub fn write_job(&self, name: &str, contents: &str) {
        std::fs::write(self.root.join(format!("{name}.json")), contents).expect("write job file");
    }

    /// Ask the daemon to stop and wait for it to exit.
    pub fn stop(&mut self) {
        let pid = self.child.id();
        let _ = Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status();
        let deadline = Instant::now() + Duration::from_millis(SPEC_WAIT_MAX_MS);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
        }
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

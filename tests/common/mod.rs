#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const BROKEN_WORKFLOW: &str = r#"name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Test
        run: cargo tset
"#;

pub const FIXED_WORKFLOW: &str = r#"name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Test
        run: cargo test
"#;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

pub fn write_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Snapshot of a failed run with one failing step whose log is `log`
pub fn failed_run_snapshot(log: &str) -> String {
    serde_json::json!({
        "workflow_name": "CI",
        "run_id": 42,
        "status": "failure",
        "jobs": [{
            "name": "build",
            "status": "failure",
            "steps": [
                {
                    "name": "Checkout",
                    "status": "success",
                    "number": 1,
                    "started_at": "2024-05-01T12:00:00Z",
                    "completed_at": "2024-05-01T12:00:05Z",
                    "log_content": "Fetching the repository"
                },
                {
                    "name": "Test",
                    "status": "failure",
                    "number": 2,
                    "started_at": "2024-05-01T12:00:05Z",
                    "completed_at": "2024-05-01T12:01:00Z",
                    "log_content": log
                }
            ]
        }]
    })
    .to_string()
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Working repository on `branch` with a bare `origin` next to it.
///
/// Returns `(remote, work)`.
pub fn repo_with_remote(branch: &str) -> (TempDir, TempDir) {
    let remote = create_test_dir();
    git(remote.path(), &["init", "-q", "--bare"]);

    let work = create_test_dir();
    git(work.path(), &["init", "-q"]);
    git(
        work.path(),
        &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)],
    );
    git(
        work.path(),
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );

    (remote, work)
}

//! Git command-line client
//!
//! Runs `git` as a child process, the same way shell steps are executed.
//! The commit identity is passed with `-c` so global git configuration is
//! never modified.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ClientError, VersionControl};
use crate::config::GitConfig;

#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: Option<PathBuf>,
    remote: String,
    author_name: String,
    author_email: String,
}

impl GitCli {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            workdir: config.workdir.clone(),
            remote: config.remote.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
        }
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    async fn run_git(&self, args: &[&str]) -> Result<String, ClientError> {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let command = format!("git {}", args.join(" "));
        debug!("Executing {}", command);

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(stdout)
        } else {
            let message = if stderr.trim().is_empty() {
                format!("exited with code {}", output.status.code().unwrap_or(-1))
            } else {
                stderr.trim().to_string()
            };
            Err(ClientError::CommandFailed { command, message })
        }
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn stage(&self, path: &Path) -> Result<(), ClientError> {
        let path = path.to_string_lossy();
        self.run_git(&["add", "--", &*path]).await?;
        info!(path = %path, "Staged");
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<(), ClientError> {
        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        self.run_git(&["-c", &name, "-c", &email, "commit", "-m", message])
            .await?;
        info!(commit_message = message, "Committed");
        Ok(())
    }

    async fn push(&self, branch: &str) -> Result<(), ClientError> {
        self.run_git(&["push", &self.remote, branch]).await?;
        info!(remote = %self.remote, branch, "Pushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = std::process::Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn init_repo(dir: &Path, branch: &str) {
        git(dir, &["init", "-q"]);
        git(dir, &["symbolic-ref", "HEAD", &format!("refs/heads/{}", branch)]);
    }

    #[tokio::test]
    async fn test_stage_commit_push() {
        let remote = tempdir().unwrap();
        git(remote.path(), &["init", "-q", "--bare"]);

        let work = tempdir().unwrap();
        init_repo(work.path(), "autofix");
        git(
            work.path(),
            &["remote", "add", "origin", remote.path().to_str().unwrap()],
        );

        let workflow = work.path().join("ci.yml");
        fs::write(&workflow, "name: ci\n").unwrap();

        let cli = GitCli::new(&GitConfig::default()).with_workdir(work.path());
        cli.stage(Path::new("ci.yml")).await.unwrap();
        cli.commit("AI: Fix attempt #1 for workflow issues")
            .await
            .unwrap();
        cli.push("autofix").await.unwrap();

        let subject = git(work.path(), &["log", "-1", "--format=%s"]);
        assert_eq!(subject, "AI: Fix attempt #1 for workflow issues");
        let author = git(work.path(), &["log", "-1", "--format=%an <%ae>"]);
        assert_eq!(author, "AI Bot <ai-bot@example.com>");

        let pushed = git(remote.path(), &["log", "-1", "--format=%s", "autofix"]);
        assert_eq!(pushed, "AI: Fix attempt #1 for workflow issues");
    }

    #[tokio::test]
    async fn test_commit_with_nothing_staged_fails() {
        let work = tempdir().unwrap();
        init_repo(work.path(), "main");

        let cli = GitCli::new(&GitConfig::default()).with_workdir(work.path());
        let err = cli.commit("empty").await.unwrap_err();
        assert!(matches!(err, ClientError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_push_to_missing_remote_fails() {
        let work = tempdir().unwrap();
        init_repo(work.path(), "main");

        let cli = GitCli::new(&GitConfig::default()).with_workdir(work.path());
        let err = cli.push("main").await.unwrap_err();
        assert!(matches!(err, ClientError::CommandFailed { .. }));
    }
}

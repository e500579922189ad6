// ABOUTME: Source-control collaborator: current commit id and one-line commit logs.
// ABOUTME: The Git implementation shells out to the git CLI in a working directory.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::{CommitId, CommitIdError};

#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("git returned an invalid commit id: {0}")]
    InvalidCommit(#[from] CommitIdError),
}

/// What the deployer needs from source control.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Commit id of the working tree being deployed.
    async fn current_commit_id(&self) -> Result<CommitId, ScmError>;

    /// One-line summaries of commits after `from` up to and including `to`,
    /// newest first.
    async fn log_summaries(&self, from: &CommitId, to: &CommitId)
    -> Result<Vec<String>, ScmError>;

    /// One-line summary of a single commit, if the repository knows it.
    async fn commit_summary(&self, commit: &CommitId) -> Result<Option<String>, ScmError>;
}

/// [`SourceControl`] backed by the `git` command.
#[derive(Debug, Clone)]
pub struct Git {
    repo_dir: PathBuf,
}

impl Git {
    pub fn new(repo_dir: &Path) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, ScmError> {
        tracing::debug!("Running 'git {}'", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;
        Ok(output)
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String, ScmError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(ScmError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SourceControl for Git {
    async fn current_commit_id(&self) -> Result<CommitId, ScmError> {
        let stdout = self.run_checked(&["rev-parse", "HEAD"]).await?;
        Ok(CommitId::new(&stdout)?)
    }

    async fn log_summaries(
        &self,
        from: &CommitId,
        to: &CommitId,
    ) -> Result<Vec<String>, ScmError> {
        let range = format!("{from}..{to}");
        let stdout = self
            .run_checked(&["log", "--pretty=format:%h %s", &range])
            .await?;
        Ok(summary_lines(&stdout))
    }

    async fn commit_summary(&self, commit: &CommitId) -> Result<Option<String>, ScmError> {
        let output = self
            .run(&["log", "-1", "--pretty=format:%h %s", commit.as_str()])
            .await?;
        // Unknown commits (e.g. staged from another clone) are not an error.
        if !output.status.success() {
            return Ok(None);
        }
        Ok(summary_lines(&String::from_utf8_lossy(&output.stdout))
            .into_iter()
            .next())
    }
}

fn summary_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

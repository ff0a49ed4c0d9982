/// Source synchronization - the trusted action behind the deployment webhook
use async_trait::async_trait;
use roster_core::{Result, RosterError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// What a pull did to the working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Nothing new on the remote
    Unchanged,
    /// The pull ran but git reported failure
    Failed(String),
    /// `HEAD` moved to `revision`
    Updated { revision: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceSync: Send + Sync {
    /// Fetch and merge from the remote
    async fn pull(&self) -> Result<PullOutcome>;
}

/// `git pull` against a local working copy
#[derive(Debug, Clone)]
pub struct GitSync {
    git_path: PathBuf,
    repo_dir: PathBuf,
    remote: String,
}

impl GitSync {
    pub fn new(git_path: PathBuf, repo_dir: PathBuf, remote: String) -> Self {
        Self {
            git_path,
            repo_dir,
            remote,
        }
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.arg("-C")
            .arg(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Current `HEAD` revision
    pub async fn head(&self) -> Result<String> {
        let output = self.git().args(["rev-parse", "HEAD"]).output().await?;

        if !output.status.success() {
            return Err(RosterError::Other(format!(
                "git rev-parse failed in {}: {}",
                self.repo_dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl SourceSync for GitSync {
    async fn pull(&self) -> Result<PullOutcome> {
        let before = self.head().await?;

        tracing::info!(
            repo = %self.repo_dir.display(),
            remote = %self.remote,
            "Pulling from remote"
        );
        let output = self.git().arg("pull").arg(&self.remote).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!("git pull failed: {}", stderr);
            return Ok(PullOutcome::Failed(stderr));
        }

        let after = self.head().await?;
        if after == before {
            Ok(PullOutcome::Unchanged)
        } else {
            tracing::info!(revision = %after, "Working copy updated");
            Ok(PullOutcome::Updated { revision: after })
        }
    }
}

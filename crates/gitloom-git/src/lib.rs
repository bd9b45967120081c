//! Version control adapter.
//!
//! Everything the synthesis engine needs from a working copy goes through the
//! [`Vcs`] trait so tests can substitute a recorder. The real implementation,
//! [`GitCli`], shells out to the system `git` binary; commit timestamps are
//! overridden through `GIT_AUTHOR_DATE` / `GIT_COMMITTER_DATE`, which is what
//! makes backdated history possible at all.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{bail, Context, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::process::Command;

/// `git check-ignore` argument batching, to stay under OS argv limits.
const CHECK_IGNORE_CHUNK: usize = 1000;

/// A push the remote refused.
#[derive(Debug, thiserror::Error)]
#[error("push failed: {stderr}")]
pub struct PushError {
    pub stderr: String,
}

impl PushError {
    /// Server-side content policy rejections (secret scanning, repository
    /// rules). These are an expected outcome when pushing synthesized history
    /// built from arbitrary file contents, and are handled by abandoning the
    /// repository instead of failing the process.
    pub fn is_policy_rejection(&self) -> bool {
        self.stderr.contains("secret-scanning")
            || self.stderr.contains("repository rule violations")
            || self.stderr.contains("GH013")
    }
}

/// Operations the scheduler performs against one working copy.
#[async_trait::async_trait]
pub trait Vcs: Send + Sync {
    async fn stage(&self, path: &Path) -> Result<()>;

    /// Create a commit with both authored and committed dates set to `date`.
    async fn commit_at(&self, message: &str, date: OffsetDateTime) -> Result<()>;

    async fn push(&self, branch: &str) -> std::result::Result<(), PushError>;

    /// Subset of `paths` excluded by the repository's own ignore rules.
    async fn ignored(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>>;
}

/// Adapter backed by the system `git` binary, rooted at one working copy.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn git(&self, args: &[&str]) -> Result<Output> {
        let verb = args.first().copied().unwrap_or("git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .with_context(|| format!("failed to spawn git {verb}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {verb} failed: {}", stderr.trim());
        }
        Ok(output)
    }

    pub async fn init(&self) -> Result<()> {
        self.git(&["init"]).await?;
        Ok(())
    }

    pub async fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        self.git(&["config", "user.name", name]).await?;
        self.git(&["config", "user.email", email]).await?;
        Ok(())
    }

    pub async fn add_origin(&self, url: &str) -> Result<()> {
        self.git(&["remote", "add", "origin", url]).await?;
        Ok(())
    }

    pub async fn rename_branch(&self, name: &str) -> Result<()> {
        self.git(&["branch", "-M", name]).await?;
        Ok(())
    }

    /// First push of a fresh repository, setting the upstream.
    pub async fn push_upstream(&self, branch: &str) -> std::result::Result<(), PushError> {
        self.run_push(&["push", "--set-upstream", "origin", branch])
            .await
    }

    async fn run_push(&self, args: &[&str]) -> std::result::Result<(), PushError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| PushError {
                stderr: format!("failed to spawn git push: {e}"),
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PushError {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl Vcs for GitCli {
    async fn stage(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.git(&["add", "--", path.as_ref()]).await?;
        Ok(())
    }

    async fn commit_at(&self, message: &str, date: OffsetDateTime) -> Result<()> {
        let stamp = date
            .format(&Rfc3339)
            .context("RFC3339 formatting of commit date")?;
        let output = Command::new("git")
            .args(["commit", "-m", message])
            .env("GIT_AUTHOR_DATE", &stamp)
            .env("GIT_COMMITTER_DATE", &stamp)
            .current_dir(&self.root)
            .output()
            .await
            .context("failed to spawn git commit")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            bail!("git commit failed: {} {}", stderr.trim(), stdout.trim());
        }
        Ok(())
    }

    async fn push(&self, branch: &str) -> std::result::Result<(), PushError> {
        self.run_push(&["push", "origin", branch]).await
    }

    async fn ignored(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut excluded = Vec::new();
        for chunk in paths.chunks(CHECK_IGNORE_CHUNK) {
            let mut cmd = Command::new("git");
            cmd.arg("check-ignore").current_dir(&self.root);
            for path in chunk {
                cmd.arg(path);
            }
            let output = cmd.output().await.context("failed to spawn git check-ignore")?;
            // Exit 0 lists the ignored subset; exit 1 means nothing in the
            // chunk is ignored. Anything else is a real failure.
            match output.status.code() {
                Some(0) | Some(1) => {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    excluded.extend(
                        stdout
                            .lines()
                            .filter(|l| !l.trim().is_empty())
                            .map(PathBuf::from),
                    );
                }
                _ => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!("git check-ignore failed: {}", stderr.trim());
                }
            }
        }
        Ok(excluded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_error(stderr: &str) -> PushError {
        PushError {
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn secret_scanning_rejection_is_policy() {
        let err = push_error(
            "remote: error: GH013: Repository rule violations found for refs/heads/main\n\
             remote: - Push cannot contain secrets (secret-scanning)",
        );
        assert!(err.is_policy_rejection());
    }

    #[test]
    fn rule_violation_alone_is_policy() {
        assert!(push_error("remote: repository rule violations found").is_policy_rejection());
    }

    #[test]
    fn auth_and_network_failures_are_not_policy() {
        assert!(!push_error("fatal: Authentication failed for 'https://...'")
            .is_policy_rejection());
        assert!(!push_error("fatal: unable to access: Could not resolve host")
            .is_policy_rejection());
    }
}

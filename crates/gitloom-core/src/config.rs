//! Run configuration and credentials.
//!
//! Everything is an explicit value object threaded down from the CLI; there is
//! no process-wide state.

use std::time::Duration;

use anyhow::{bail, Result};

/// Knobs for one synthesis run, shared by every repository in it.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Minimum number of commits per repository.
    pub target_commits: usize,
    /// Commits per push batch.
    pub batch_size: usize,
    /// Age window in years; all dates land in `[now - max_years, now]`.
    pub max_years: u32,
    /// Pause between filler commits, to stay friendly to remote rate limits.
    pub filler_delay: Duration,
    /// Branch every repository is pushed to.
    pub branch: String,
    /// Create remote repositories as private.
    pub private: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_commits: 150,
            batch_size: 50,
            max_years: 7,
            filler_delay: Duration::from_millis(500),
            branch: "main".to_string(),
            private: false,
        }
    }
}

impl RunConfig {
    /// Reject configurations that would wedge the scheduler.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.max_years == 0 {
            bail!("age window must cover at least 1 year");
        }
        Ok(())
    }
}

/// GitHub identity and token, read from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub username: String,
    pub email: String,
}

impl Credentials {
    /// Load `GITHUB_TOKEN`, `GITHUB_USERNAME`, and `GITHUB_EMAIL`. Fails fast
    /// with the variable name when one is missing or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            token: required("GITHUB_TOKEN")?,
            username: required("GITHUB_USERNAME")?,
            email: required("GITHUB_EMAIL")?,
        })
    }
}

/// Just the token, for commands that never touch a working copy.
pub fn token_from_env() -> Result<String> {
    required("GITHUB_TOKEN")
}

fn required(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{name} is not set"),
    }
}

//! Batch publishing.
//!
//! Commits are created locally and pushed in batches. A push the remote
//! refuses for content-policy reasons (secret scanning, repository rules) is
//! terminal for the repository but not for the process; anything else needs
//! operator attention and propagates.

use anyhow::Result;
use gitloom_git::Vcs;

/// What a publish attempt decided.
#[derive(Debug)]
pub enum PushDisposition {
    Pushed,
    /// The remote refused the batch for policy reasons; the repository's
    /// remaining plan must be abandoned. Already-pushed history stays.
    PolicyRejected(String),
}

pub struct BatchPublisher {
    batch_size: usize,
    branch: String,
}

impl BatchPublisher {
    pub fn new(batch_size: usize, branch: impl Into<String>) -> Self {
        Self {
            batch_size,
            branch: branch.into(),
        }
    }

    /// Whether the plan entry at `index` closes a batch. Counts plan entries,
    /// not successful commits, so skipped entries still advance the cadence.
    pub fn is_batch_boundary(&self, index: usize, is_last: bool) -> bool {
        (index + 1) % self.batch_size == 0 || is_last
    }

    /// Push the current batch and classify any rejection.
    pub async fn publish(&self, vcs: &dyn Vcs) -> Result<PushDisposition> {
        match vcs.push(&self.branch).await {
            Ok(()) => Ok(PushDisposition::Pushed),
            Err(err) if err.is_policy_rejection() => {
                tracing::warn!(detail = %err.stderr, "remote rejected batch for policy reasons");
                Ok(PushDisposition::PolicyRejected(err.stderr))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_on_batch_multiples_and_the_last_entry() {
        let publisher = BatchPublisher::new(50, "main");
        let total = 73usize;
        let boundaries: Vec<usize> = (0..total)
            .filter(|&i| publisher.is_batch_boundary(i, i + 1 == total))
            .collect();
        // Entries 50 and 73 in 1-based terms.
        assert_eq!(boundaries, vec![49, 72]);
    }

    #[test]
    fn aligned_totals_do_not_double_push_the_last_entry() {
        let publisher = BatchPublisher::new(25, "main");
        let total = 50usize;
        let boundaries: Vec<usize> = (0..total)
            .filter(|&i| publisher.is_batch_boundary(i, i + 1 == total))
            .collect();
        assert_eq!(boundaries, vec![24, 49]);
    }

    #[test]
    fn batch_size_one_pushes_every_entry() {
        let publisher = BatchPublisher::new(1, "main");
        assert!((0..5).all(|i| publisher.is_batch_boundary(i, false)));
    }
}

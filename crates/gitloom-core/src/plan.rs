//! Commit plan model.
//!
//! A plan is built once per repository, consumed entry by entry, and discarded
//! when the repository finishes. Nothing here persists across repositories or
//! process restarts.

use std::path::PathBuf;

use time::OffsetDateTime;

/// What a planned commit stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitKind {
    /// No project content; mutates the dedicated filler artifact to reach the
    /// target commit count.
    Filler,
    /// Stages one actual project file.
    Real(PathBuf),
}

/// One planned commit with its backdated timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub kind: CommitKind,
    pub date: OffsetDateTime,
}

/// Ordered plan for one repository: fillers first, then one entry per real
/// file in caller order.
#[derive(Debug, Clone, Default)]
pub struct CommitPlan {
    pub entries: Vec<PlanEntry>,
}

impl CommitPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of filler entries at the head of the plan.
    pub fn filler_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == CommitKind::Filler)
            .count()
    }
}

/// Counters accumulated while executing a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Commits actually created.
    pub committed: usize,
    /// Entries skipped (deny-listed, vanished, ignored, or per-entry failure).
    pub skipped: usize,
    /// Successful pushes.
    pub pushes: usize,
}

/// How one repository's plan ended. Fatal failures are reported as errors,
/// not as an outcome variant, so callers cannot miss them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every entry was processed.
    Completed(RunStats),
    /// The remote rejected a push for policy reasons; remaining entries were
    /// abandoned. History already pushed stays published.
    Aborted {
        /// Plan index of the entry whose batch was rejected.
        at_entry: usize,
        /// Remote rejection detail, for the audit trail.
        reason: String,
        stats: RunStats,
    },
}

impl RunOutcome {
    pub fn stats(&self) -> RunStats {
        match self {
            RunOutcome::Completed(stats) => *stats,
            RunOutcome::Aborted { stats, .. } => *stats,
        }
    }
}

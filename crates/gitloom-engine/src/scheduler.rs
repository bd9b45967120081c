//! Commit scheduling and execution.
//!
//! `plan` decides how many filler and real commits a repository needs and
//! assigns every entry a backdated timestamp. `execute` walks the plan
//! strictly in order, one commit at a time, handing batches to the
//! [`BatchPublisher`]. A bad entry is logged and skipped; only push failures
//! can end a repository early.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gitloom_core::config::RunConfig;
use gitloom_core::{dates, denylist, CommitKind, CommitPlan, PlanEntry, RunOutcome, RunStats};
use gitloom_git::Vcs;
use rand::Rng;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::publisher::{BatchPublisher, PushDisposition};

/// Filler commits append to this artifact so each one has a non-empty diff.
pub const FILLER_ARTIFACT: &str = "commit_dates.jsonl";

pub struct Scheduler<'a> {
    vcs: &'a dyn Vcs,
    config: &'a RunConfig,
    repo_root: PathBuf,
}

impl<'a> Scheduler<'a> {
    pub fn new(vcs: &'a dyn Vcs, config: &'a RunConfig, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            config,
            repo_root: repo_root.into(),
        }
    }

    /// Build the plan for one repository: enough filler entries to reach the
    /// target count (never negative), then one real entry per file in the
    /// caller-supplied order. Year bucket and date are drawn independently
    /// per entry, so the date sequence is deliberately not monotonic —
    /// consumers must not assume ordered commit dates.
    pub fn plan(
        &self,
        real_files: &[PathBuf],
        now: OffsetDateTime,
        rng: &mut impl Rng,
    ) -> CommitPlan {
        let filler = self.config.target_commits.saturating_sub(real_files.len());
        let mut entries = Vec::with_capacity(filler + real_files.len());
        for _ in 0..filler {
            entries.push(PlanEntry {
                kind: CommitKind::Filler,
                date: self.draw_date(now, rng),
            });
        }
        for file in real_files {
            entries.push(PlanEntry {
                kind: CommitKind::Real(file.clone()),
                date: self.draw_date(now, rng),
            });
        }
        CommitPlan { entries }
    }

    fn draw_date(&self, now: OffsetDateTime, rng: &mut impl Rng) -> OffsetDateTime {
        let years_back = dates::draw_years_back(self.config.max_years, rng);
        dates::select_date(now, self.config.max_years, years_back, rng)
    }

    /// Consume the plan. Returns `Ok(Aborted { .. })` when the remote rejects
    /// a batch for policy reasons, `Err` for any other push failure.
    pub async fn execute(
        &self,
        plan: &CommitPlan,
        publisher: &BatchPublisher,
    ) -> Result<RunOutcome> {
        let mut stats = RunStats::default();
        let total = plan.len();

        for (index, entry) in plan.entries.iter().enumerate() {
            let applied = match &entry.kind {
                CommitKind::Filler => self.commit_filler(entry.date).await,
                CommitKind::Real(path) => self.commit_real(path, entry.date).await,
            };
            match applied {
                Ok(true) => stats.committed += 1,
                Ok(false) => stats.skipped += 1,
                Err(err) => {
                    stats.skipped += 1;
                    tracing::warn!(index, date = %entry.date, "entry failed, continuing: {err:#}");
                }
            }

            // Pacing applies between filler commits only; the first real
            // commit starts without a gap.
            let next_is_filler = plan
                .entries
                .get(index + 1)
                .is_some_and(|next| next.kind == CommitKind::Filler);
            if entry.kind == CommitKind::Filler
                && next_is_filler
                && !self.config.filler_delay.is_zero()
            {
                tokio::time::sleep(self.config.filler_delay).await;
            }

            if publisher.is_batch_boundary(index, index + 1 == total) {
                match publisher.publish(self.vcs).await? {
                    PushDisposition::Pushed => stats.pushes += 1,
                    PushDisposition::PolicyRejected(reason) => {
                        tracing::warn!(
                            at_entry = index,
                            "abandoning repository after remote policy rejection"
                        );
                        return Ok(RunOutcome::Aborted {
                            at_entry: index,
                            reason,
                            stats,
                        });
                    }
                }
            }
        }

        Ok(RunOutcome::Completed(stats))
    }

    async fn commit_filler(&self, date: OffsetDateTime) -> Result<bool> {
        let stamp = date.format(&Rfc3339).context("format filler timestamp")?;
        let artifact = self.repo_root.join(FILLER_ARTIFACT);
        append_record(&artifact, &stamp)?;
        self.vcs.stage(&artifact).await?;
        self.vcs
            .commit_at(&format!("Update data {}", short_date(date)), date)
            .await?;
        Ok(true)
    }

    async fn commit_real(&self, path: &Path, date: OffsetDateTime) -> Result<bool> {
        if denylist::is_denied(path) {
            tracing::debug!(path = %path.display(), "deny-listed, skipping");
            return Ok(false);
        }
        if !path.exists() {
            tracing::debug!(path = %path.display(), "vanished since inventory, skipping");
            return Ok(false);
        }
        let excluded = self.vcs.ignored(std::slice::from_ref(&path.to_path_buf())).await?;
        if !excluded.is_empty() {
            tracing::debug!(path = %path.display(), "excluded by ignore rules, skipping");
            return Ok(false);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.vcs.stage(path).await?;
        self.vcs.commit_at(&format!("Update {name}"), date).await?;
        Ok(true)
    }
}

/// One JSONL record per filler commit, append-only.
fn append_record(path: &Path, stamp: &str) -> Result<()> {
    let record = serde_json::json!({ "timestamp": stamp });
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    writeln!(file, "{record}")?;
    Ok(())
}

fn short_date(date: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

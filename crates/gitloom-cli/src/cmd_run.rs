//! The orchestrator: one repository at a time, strictly sequential.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gitloom_core::config::{Credentials, RunConfig};
use gitloom_core::RunOutcome;
use gitloom_engine::{inventory, BatchPublisher, Scheduler};
use gitloom_git::{GitCli, Vcs};
use gitloom_hub::{authenticated_url, HubClient};
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::OffsetDateTime;

pub async fn execute(projects: &Path, config: &RunConfig, creds: &Credentials) -> Result<()> {
    let hub = HubClient::new(&creds.token);
    let repos = project_dirs(projects)?;
    if repos.is_empty() {
        println!("No project directories under {}", projects.display());
        return Ok(());
    }

    let mut completed = 0usize;
    let mut aborted = 0usize;
    let mut failed: Vec<String> = Vec::new();

    for repo in &repos {
        let name = repo_name(repo);
        println!("Processing {name}");
        match process_repo(repo, &name, config, creds, &hub).await {
            Ok(RunOutcome::Completed(stats)) => {
                completed += 1;
                println!(
                    "  ✓ {name}: {} commits in {} pushes ({} skipped)",
                    stats.committed, stats.pushes, stats.skipped
                );
            }
            Ok(RunOutcome::Aborted {
                at_entry, stats, ..
            }) => {
                aborted += 1;
                println!(
                    "  ⚠ {name}: abandoned at entry {} after a remote policy rejection \
                     ({} commits already published)",
                    at_entry + 1,
                    stats.committed
                );
            }
            Err(err) => {
                // A failed repository never stops its siblings.
                eprintln!("  ✗ {name}: {err:#}");
                failed.push(name);
            }
        }
    }

    println!(
        "Done: {completed} completed, {aborted} abandoned, {} failed",
        failed.len()
    );
    for name in &failed {
        println!("  failed: {name}");
    }
    Ok(())
}

/// Immediate subdirectories of the projects root, sorted.
fn project_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("reading projects root {}", root.display()))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string())
}

async fn process_repo(
    repo: &Path,
    name: &str,
    config: &RunConfig,
    creds: &Credentials,
    hub: &HubClient,
) -> Result<RunOutcome> {
    let git = GitCli::new(repo);
    git.init().await?;
    git.set_identity(&creds.username, &creds.email).await?;

    let clone_url = hub.create_repo(name, config.private).await?;
    tracing::info!(name, "created remote repository");
    git.add_origin(&authenticated_url(&clone_url, &creds.token))
        .await?;

    // A fresh remote needs at least one commit before history synthesis.
    let readme = repo.join("README.md");
    if !readme.exists() {
        std::fs::write(&readme, format!("# {name}\n"))
            .with_context(|| format!("writing {}", readme.display()))?;
    }
    git.stage(&readme).await?;
    git.commit_at("Initial commit", OffsetDateTime::now_utc())
        .await?;
    git.rename_branch(&config.branch).await?;
    git.push_upstream(&config.branch)
        .await
        .map_err(anyhow::Error::from)?;

    let files = collect_candidates(&git, repo).await?;
    tracing::info!(name, count = files.len(), "candidate files after ignore filtering");

    let scheduler = Scheduler::new(&git, config, repo);
    let publisher = BatchPublisher::new(config.batch_size, config.branch.clone());
    let mut rng = StdRng::from_entropy();
    let plan = scheduler.plan(&files, OffsetDateTime::now_utc(), &mut rng);
    scheduler.execute(&plan, &publisher).await
}

/// Inventory minus whatever the repository's own ignore rules exclude. A
/// failed check-ignore batch degrades to "not ignored"; the deny-list still
/// protects sensitive names downstream.
async fn collect_candidates(vcs: &dyn Vcs, repo: &Path) -> Result<Vec<PathBuf>> {
    let files = inventory::list_files(repo)?;
    match vcs.ignored(&files).await {
        Ok(excluded) => {
            let excluded: HashSet<PathBuf> = excluded.into_iter().collect();
            Ok(files
                .into_iter()
                .filter(|f| !excluded.contains(f))
                .collect())
        }
        Err(err) => {
            tracing::warn!("check-ignore failed, using unfiltered inventory: {err:#}");
            Ok(files)
        }
    }
}

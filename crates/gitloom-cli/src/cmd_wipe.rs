//! Delete every owned remote repository. Destructive, so it verifies token
//! scopes and asks for typed confirmation first.

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};
use gitloom_core::config::token_from_env;
use gitloom_hub::HubClient;

/// Pause between deletions to stay under API rate limits.
const DELETE_PACING: Duration = Duration::from_secs(1);

pub async fn execute(yes: bool) -> Result<()> {
    let token = token_from_env()?;
    let hub = HubClient::new(token);

    let scopes = hub.token_scopes().await?;
    for required in ["repo", "delete_repo"] {
        if !scopes.iter().any(|s| s == required) {
            bail!("token is missing the `{required}` scope");
        }
    }

    let repos = hub.list_owned().await?;
    let private = repos.iter().filter(|r| r.private).count();
    println!(
        "Found {} repositories ({} private, {} public)",
        repos.len(),
        private,
        repos.len() - private
    );
    if repos.is_empty() {
        return Ok(());
    }

    if !yes && !confirm(repos.len())? {
        println!("Cancelled.");
        return Ok(());
    }

    let mut deleted = 0usize;
    for repo in &repos {
        match hub.delete_repo(&repo.owner.login, &repo.name).await {
            Ok(()) => {
                deleted += 1;
                println!("  ✓ deleted {}", repo.name);
            }
            Err(err) => eprintln!("  ✗ {}: {err:#}", repo.name),
        }
        tokio::time::sleep(DELETE_PACING).await;
    }
    println!("Deleted {deleted} of {} repositories", repos.len());
    Ok(())
}

fn confirm(count: usize) -> Result<bool> {
    println!("WARNING: this deletes {count} repositories from your account and cannot be undone.");
    print!("Type DELETE to confirm: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim() == "DELETE")
}

//! Flip every owned public repository to private.

use anyhow::Result;
use gitloom_core::config::token_from_env;
use gitloom_hub::HubClient;

pub async fn execute() -> Result<()> {
    let token = token_from_env()?;
    let hub = HubClient::new(token);

    let repos = hub.list_owned().await?;
    println!("Retrieved {} repositories", repos.len());

    let mut changed = 0usize;
    for repo in &repos {
        if repo.private {
            println!("  {} is already private", repo.name);
            continue;
        }
        hub.set_private(&repo.owner.login, &repo.name).await?;
        changed += 1;
        println!("  ✓ set {} private", repo.name);
    }
    println!("{changed} repositories changed");
    Ok(())
}

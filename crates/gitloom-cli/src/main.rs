mod cmd_privatize;
mod cmd_run;
mod cmd_wipe;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gitloom_core::config::{Credentials, RunConfig};

#[derive(Parser)]
#[command(
    name = "gitloom",
    version,
    about = "Synthesize multi-year commit histories and publish them"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish a synthesized history for every directory under a projects root
    Run {
        /// Directory whose immediate subdirectories become repositories
        #[arg(long)]
        projects: PathBuf,
        /// Minimum commits per repository
        #[arg(long, default_value = "150")]
        commits: usize,
        /// Commits per push batch
        #[arg(long, default_value = "50")]
        batch_size: usize,
        /// Age window in years; commit dates land within it
        #[arg(long, default_value = "7")]
        max_years: u32,
        /// Pause between filler commits, in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,
        /// Create remote repositories as private
        #[arg(long)]
        private: bool,
    },
    /// Delete every repository owned by the authenticated user
    Wipe {
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Set every owned public repository to private
    Privatize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run {
            projects,
            commits,
            batch_size,
            max_years,
            delay_ms,
            private,
        } => {
            let config = RunConfig {
                target_commits: commits,
                batch_size,
                max_years,
                filler_delay: Duration::from_millis(delay_ms),
                private,
                ..RunConfig::default()
            };
            config.validate()?;
            let creds = Credentials::from_env()?;
            cmd_run::execute(&projects, &config, &creds).await
        }
        Command::Wipe { yes } => cmd_wipe::execute(yes).await,
        Command::Privatize => cmd_privatize::execute().await,
    }
}

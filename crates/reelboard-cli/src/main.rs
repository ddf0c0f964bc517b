mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelboard_core::Platform;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reelboard-cli")]
#[command(about = "Reelboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a live profile and print the stats response
    Stats {
        /// `tiktok` or `youtube`
        #[arg(long)]
        platform: Platform,
        /// Profile handle, without the leading `@`
        #[arg(long)]
        handle: String,
    },
    /// Run extraction on a saved profile page without touching the network
    Extract {
        #[arg(long)]
        platform: Platform,
        /// Handle recorded as the username in the output
        #[arg(long)]
        handle: String,
        /// Path to the saved HTML document
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("reelboard-cli: use --help to list commands");
        return Ok(());
    };

    let config = reelboard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Stats { platform, handle } => {
            stats::run_stats(&config, platform, strip_at(&handle)).await
        }
        Commands::Extract {
            platform,
            handle,
            file,
        } => stats::run_extract(platform, strip_at(&handle), &file),
    }
}

fn strip_at(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}

mod cli;
mod client;
mod config;
mod error;
mod search;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::SearchOptions;

#[derive(Parser)]
#[command(
    name = "deep-mem",
    version,
    about = "Progressive-disclosure search over a remote memory store"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search memories with progressive thread discovery
    Search {
        /// Search query text
        query: String,
        /// Max memories to return
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
        /// Max related threads
        #[arg(short = 't', long, default_value_t = 5)]
        threads: usize,
        /// Show more content per memory
        #[arg(short, long)]
        verbose: bool,
        /// Skip related-thread discovery
        #[arg(long)]
        no_threads: bool,
        /// Comma-separated labels to filter memories
        #[arg(long)]
        labels: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// View full content of a specific thread
    Expand {
        /// Thread ID as shown in search results
        thread_id: String,
    },
    /// Check configuration and API connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::DeepMemConfig::load()?;

    // Log to stderr so stdout stays clean for search output and --json.
    let filter = EnvFilter::try_new(&config.output.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Search {
            query,
            limit,
            threads,
            verbose,
            no_threads,
            labels,
            json,
        } => {
            let opts = SearchOptions {
                memory_limit: limit,
                thread_limit: threads,
                expand_threads: !no_threads,
                filter_labels: labels,
            };
            cli::search::search(&config, &query, &opts, verbose, json).await?;
        }
        Command::Expand { thread_id } => {
            cli::expand::expand(&config, &thread_id).await?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config).await?;
        }
    }

    Ok(())
}
